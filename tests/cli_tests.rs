use std::time::Duration;

use clap::Parser;
use secrecy::ExposeSecret;
use vmc_samples_lib::cli::{Cli, Command};
use vmc_samples_lib::{commands, config};
use vmc_workflow::api::{ResourceKind, ResourceReference};
use vmc_workflow::artifacts::{ArtifactKind, CreatedArtifact};
use vmc_workflow::cleanup::CleanupReport;
use vmc_workflow::deploy_vm::DeployReport;
use vmc_workflow::library_import::{ExportTarget, LibraryImportReport};
use vmc_workflow::subnets::CompatibleSubnet;
use vmc_workflow::{ErrorKind, ExistingPolicy, MatchPolicy, WorkflowError};
use vmc_vsphere::types::DeploymentTarget;

fn parse(args: &[&str]) -> Cli {
    let mut full = vec!["vmc-samples"];
    full.extend_from_slice(args);
    Cli::try_parse_from(full).expect("arguments should parse")
}

fn import_args(extra: &[&str]) -> vmc_samples_lib::cli::OvfImportExportArgs {
    let mut args = vec![
        "ovf-import-export",
        "--server",
        "vcenter.example.test",
        "--username",
        "administrator@vsphere.local",
        "--password",
        "s3cret",
    ];
    args.extend_from_slice(extra);
    match parse(&args).command {
        Command::OvfImportExport(a) => a,
        other => panic!("unexpected command {other:?}"),
    }
}

fn deploy_args(extra: &[&str]) -> vmc_samples_lib::cli::DeployVmArgs {
    let mut args = vec![
        "deploy-vm",
        "-r",
        "refresh-123",
        "-o",
        "org-1",
        "-s",
        "sddc-1",
        "--libitem-name",
        "centos-template",
    ];
    args.extend_from_slice(extra);
    match parse(&args).command {
        Command::DeployVm(a) => a,
        other => panic!("unexpected command {other:?}"),
    }
}

#[test]
fn test_import_defaults() {
    let args = import_args(&[]);
    assert_eq!(args.datastore_name, "WorkloadDatastore");
    assert_eq!(args.library_name, "demo-lib");
    assert_eq!(args.item_name, "simpleVmTemplate");
    assert!(!args.run.cleardata);
    assert!(!args.run.first_match);
    assert_eq!(args.run.timeout_secs, 600);

    let options = config::import_options(&args).unwrap();
    assert_eq!(options.export, None);
    assert_eq!(config::import_existing_policy(&args), ExistingPolicy::Fail);
}

#[test]
fn test_import_flags() {
    let args = import_args(&[
        "--datastorename",
        "vsanDatastore",
        "-c",
        "--first-match",
        "--reuse-existing",
        "--timeout-secs",
        "45",
    ]);
    assert_eq!(args.datastore_name, "vsanDatastore");

    let cfg = config::workflow_config(&args.run, config::import_existing_policy(&args)).unwrap();
    assert!(cfg.clear_data);
    assert_eq!(cfg.match_policy, MatchPolicy::FirstMatch);
    assert_eq!(cfg.existing, ExistingPolicy::Reuse);
    assert_eq!(cfg.call_timeout, Duration::from_secs(45));
}

#[test]
fn test_export_dir_implies_export() {
    let out = tempfile::tempdir().unwrap();
    let dir = out.path().to_str().unwrap();
    let options = config::import_options(&import_args(&["--export-dir", dir])).unwrap();
    assert_eq!(options.export, Some(ExportTarget::Directory(out.path().to_path_buf())));

    let options = config::import_options(&import_args(&["--export"])).unwrap();
    assert_eq!(options.export, Some(ExportTarget::TempDir));
}

#[test]
fn test_missing_ovf_dir_is_rejected() {
    let err = config::import_options(&import_args(&["--ovf-dir", "/definitely/not/here"])).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(err.kind().exit_code(), 2);
}

#[test]
fn test_server_forms() {
    let ep = config::vcenter_endpoint(&import_args(&[])).unwrap();
    assert_eq!(ep.host, "vcenter.example.test");
    assert_eq!(ep.port, 443);
    assert!(!ep.insecure);
    assert_eq!(ep.password.expose_secret(), "s3cret");

    let mut args = import_args(&["--skip-verification"]);
    args.server = "https://vc.lab.local:8443/".into();
    let ep = config::vcenter_endpoint(&args).unwrap();
    assert_eq!(ep.host, "vc.lab.local");
    assert_eq!(ep.port, 8443);
    assert!(ep.insecure);

    args.server = "   ".into();
    assert!(matches!(config::vcenter_endpoint(&args), Err(WorkflowError::Validation(_))));
}

#[test]
fn test_password_is_not_in_debug_output() {
    let args = import_args(&[]);
    assert!(!format!("{args:?}").contains("s3cret"));
}

#[test]
fn test_zero_timeout_is_rejected() {
    let args = import_args(&["--timeout-secs", "0"]);
    let err = config::workflow_config(&args.run, ExistingPolicy::Fail).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
}

#[test]
fn test_deploy_defaults() {
    let args = deploy_args(&[]);
    assert_eq!(args.refresh_token.expose_secret(), "refresh-123");
    let options = config::deploy_options(&args).unwrap();
    assert_eq!(options.datacenter_name, "SDDC-Datacenter");
    assert_eq!(options.resourcepool_name, "Compute-ResourcePool");
    assert_eq!(options.folder_name, "Workloads");
    assert!(options.vm_name.starts_with("Deploy VM Sample - "));

    let console = config::console_config(&args.refresh_token, &args.console, 30).unwrap();
    assert_eq!(console.vmc_url, "https://vmc.vmware.com");
    assert_eq!(console.csp_url, "https://console.cloud.vmware.com");
    assert_eq!(console.timeout_secs, 30);
}

#[test]
fn test_deploy_overrides() {
    let args = deploy_args(&[
        "--vm-name",
        "web-01",
        "--folder-name",
        "Apps",
        "--console-url",
        "https://vmc.example.test/",
        "-c",
    ]);
    let options = config::deploy_options(&args).unwrap();
    assert_eq!(options.vm_name, "web-01");
    assert_eq!(options.folder_name, "Apps");
    assert!(args.run.cleardata);

    let console = config::console_config(&args.refresh_token, &args.console, 30).unwrap();
    assert_eq!(console.vmc_url, "https://vmc.example.test");
}

#[test]
fn test_bad_console_url_is_rejected() {
    let args = deploy_args(&["--console-url", "ftp://vmc.example.test"]);
    let err = config::console_config(&args.refresh_token, &args.console, 30).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
}

#[test]
fn test_deploy_requires_item_name() {
    let result = Cli::try_parse_from(["vmc-samples", "deploy-vm", "-r", "x", "-o", "org", "-s", "sddc"]);
    assert!(result.is_err());
}

#[test]
fn test_deploy_summary_lines() {
    let report = DeployReport {
        sddc_name: Some("Lab".into()),
        vcenter: "vcenter.sddc-1.vmwarevmc.com".into(),
        item: ResourceReference {
            kind: ResourceKind::LibraryItem,
            name: "centos-template".into(),
            id: "item-1".into(),
        },
        target: DeploymentTarget {
            resource_pool_id: "resgroup-9".into(),
            folder_id: Some("group-v5".into()),
            host_id: None,
        },
        resource_type: "VirtualMachine".into(),
        vm_id: "vm-42".into(),
        vm_name: "web-01".into(),
        warnings: vec!["Unsupported element 'Foo'".into()],
    };
    let lines = commands::deploy_summary(&report);
    assert_eq!(
        lines,
        vec![
            "Deployment successful. Result resource: VirtualMachine, ID: vm-42, Name: 'web-01'".to_string(),
            "OVF warning: Unsupported element 'Foo'".to_string(),
        ]
    );
}

#[test]
fn test_deploy_failure_lines() {
    let err = WorkflowError::remote(
        "deploy OVF template",
        "web-01",
        vec!["Insufficient disk space".into()],
    );
    assert_eq!(commands::deploy_failure(&err), vec!["OVF error: Insufficient disk space".to_string()]);
    assert!(commands::deploy_failure(&WorkflowError::Validation("x".into())).is_empty());
}

#[test]
fn test_import_summary_lines() {
    let report = LibraryImportReport {
        datastore: ResourceReference {
            kind: ResourceKind::Datastore,
            name: "WorkloadDatastore".into(),
            id: "datastore-61".into(),
        },
        library_id: "lib-1".into(),
        library_reused: false,
        item_id: "item-1".into(),
        item_reused: true,
        uploaded: vec!["simple.ovf".into(), "disk-0.vmdk".into()],
        export_dir: None,
        downloaded: vec![],
    };
    let lines = commands::import_summary(&report);
    assert_eq!(lines[0], "Datastore 'WorkloadDatastore' resolved to datastore-61");
    assert_eq!(lines[1], "Library created: lib-1");
    assert_eq!(lines[2], "Library item reused: item-1");
    assert_eq!(lines[3], "Uploaded 2 file(s): simple.ovf, disk-0.vmdk");
    assert_eq!(lines.len(), 4);
}

#[test]
fn test_subnet_table() {
    assert_eq!(commands::subnet_table(&[]), vec!["No subnets reported.".to_string()]);
    let rows = [CompatibleSubnet {
        vpc_id: "vpc-1".into(),
        vpc_cidr: None,
        subnet_id: "subnet-a".into(),
        name: None,
        availability_zone: Some("us-west-2a".into()),
        cidr: None,
        compatible: true,
        note: None,
    }];
    let lines = commands::subnet_table(&rows);
    assert_eq!(lines.len(), 2);
    assert!(lines[1].starts_with("vpc-1"));
    assert!(lines[1].ends_with("yes"));
}

#[test]
fn test_cleanup_summary_lists_each_deleted_artifact() {
    let artifact = |kind, name: &str, id: &str| CreatedArtifact { kind, name: name.into(), id: id.into() };
    let report = CleanupReport {
        ran: true,
        removed: vec![
            artifact(ArtifactKind::LibraryItem, "simpleVmTemplate", "item-1"),
            artifact(ArtifactKind::Library, "demo-lib", "lib-1"),
        ],
        failed: vec![(
            artifact(ArtifactKind::VirtualMachine, "web-01", "vm-42"),
            WorkflowError::remote("delete VirtualMachine", "web-01", vec!["busy".into()]),
        )],
    };
    assert_eq!(
        commands::cleanup_summary(&report),
        vec![
            "Deleted LibraryItem 'simpleVmTemplate' (item-1)".to_string(),
            "Deleted Library 'demo-lib' (lib-1)".to_string(),
        ]
    );
    assert!(commands::cleanup_summary(&CleanupReport::skipped()).is_empty());
}
