use anyhow::Result;
use assert_cmd::Command;
use hognest_bio::formats::{read_encoding_json, ASSOCIATIONS_TSV, ENCODING_JSON, GROUPS_TSV};
use hognest_bio::{HogForest, OrthologGroupNode};
use hognest_core::{Config, NodeId};
use hognest_test::{primate_forest, TestEnvironment};
use predicates::prelude::*;
use std::path::PathBuf;

fn hognest_cmd() -> Command {
    let mut cmd = Command::cargo_bin("hognest").unwrap();
    cmd.env_remove("HOGNEST_CONFIG").env_remove("RUST_LOG");
    cmd
}

/// Forest, catalog and sharing files of the primate fixture
fn primate_inputs(env: &TestEnvironment) -> Result<(PathBuf, PathBuf, PathBuf)> {
    let forest = env.write_forest("forest.json", &primate_forest())?;
    let catalog = env.write_catalog(
        "catalog.tsv",
        &["HUMAN00001", "HUMAN00002", "PANTR00001", "FAKE100001", "MOUSE00001"],
    )?;
    let sharing = env.write_sharing("sharing.tsv", &[(9595, "FAKE1"), (9595, "FAKE2")])?;
    Ok((forest, catalog, sharing))
}

#[test]
fn test_cli_help_command() {
    hognest_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("encode"))
        .stdout(predicate::str::contains("verify"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn test_encode_then_verify() -> Result<()> {
    let env = TestEnvironment::new()?;
    let (forest, catalog, sharing) = primate_inputs(&env)?;

    hognest_cmd()
        .arg("encode")
        .arg("--forest").arg(&forest)
        .arg("--catalog").arg(&catalog)
        .arg("--sharing").arg(&sharing)
        .arg("--out").arg(env.output_dir())
        .assert()
        .success()
        .stdout(predicate::str::contains("Associations: 5"));

    let associations = env.read_output(ASSOCIATIONS_TSV)?;
    assert!(associations.contains("FAKE100001\t4\n"));

    hognest_cmd()
        .arg("verify")
        .arg("--groups").arg(env.output_dir().join(GROUPS_TSV))
        .arg("--associations").arg(env.output_dir().join(ASSOCIATIONS_TSV))
        .arg("--catalog").arg(&catalog)
        .assert()
        .success()
        .stdout(predicate::str::contains("5 group records form a valid nested set"));

    Ok(())
}

#[test]
fn test_encode_json_in_parallel() -> Result<()> {
    let env = TestEnvironment::new()?;
    let (forest, catalog, sharing) = primate_inputs(&env)?;

    hognest_cmd()
        .arg("encode")
        .arg("--forest").arg(&forest)
        .arg("--catalog").arg(&catalog)
        .arg("--sharing").arg(&sharing)
        .arg("--out").arg(env.output_dir())
        .arg("--format").arg("json")
        .arg("--parallel")
        .assert()
        .success();

    let encoding = read_encoding_json(env.read_output(ENCODING_JSON)?.as_bytes())?;
    assert_eq!(encoding.groups.len(), 5);
    assert_eq!(encoding.associations[3].parent_node_id, NodeId(4));
    assert_eq!(encoding.report.catalog_misses, 3);
    Ok(())
}

#[test]
fn test_configured_start_values() -> Result<()> {
    let env = TestEnvironment::new()?;
    let (forest, catalog, _) = primate_inputs(&env)?;
    let mut config = Config::default();
    config.encoding.first_bound = 100;
    config.encoding.first_node_id = 7;
    let config_path = env.write_config("hognest.toml", &config)?;

    hognest_cmd()
        .arg("encode")
        .arg("--forest").arg(&forest)
        .arg("--catalog").arg(&catalog)
        .arg("--out").arg(env.output_dir())
        .env("HOGNEST_CONFIG", &config_path)
        .assert()
        .success();

    let groups = env.read_output(GROUPS_TSV)?;
    assert!(groups.contains("\n7\tHOG:0000001\t100\t107\t207598\n"));
    Ok(())
}

#[test]
fn test_cyclic_depth_writes_nothing() -> Result<()> {
    let env = TestEnvironment::new()?;
    let mut deep = OrthologGroupNode::new();
    for _ in 0..10 {
        deep = OrthologGroupNode::new().with_child(deep);
    }
    let forest = env.write_forest("deep.json", &HogForest::new().with_group("HOG:deep", deep))?;
    let catalog = env.write_catalog("catalog.tsv", &[])?;
    let mut config = Config::default();
    config.encoding.max_depth = 5;
    let config_path = env.write_config("shallow.toml", &config)?;

    hognest_cmd()
        .arg("encode")
        .arg("--forest").arg(&forest)
        .arg("--catalog").arg(&catalog)
        .arg("--out").arg(env.output_dir())
        .arg("--config").arg(&config_path)
        .assert()
        .failure()
        .code(5)
        .stderr(predicate::str::contains("HOG:deep"));

    assert!(!env.output_dir().join(GROUPS_TSV).exists());
    Ok(())
}

#[test]
fn test_error_exit_codes() -> Result<()> {
    let env = TestEnvironment::new()?;
    let catalog = env.write_catalog("catalog.tsv", &[])?;
    let broken = env.write_input("broken.json", b"{ \"groups\": [ ")?;

    // Missing forest file
    hognest_cmd()
        .arg("encode")
        .arg("--forest").arg(env.input_dir().join("absent.json"))
        .arg("--catalog").arg(&catalog)
        .assert()
        .code(3);

    // Malformed forest
    hognest_cmd()
        .arg("encode")
        .arg("--forest").arg(&broken)
        .arg("--catalog").arg(&catalog)
        .assert()
        .code(4)
        .stderr(predicate::str::contains("broken.json"));

    // Invalid configuration
    let bad_config = env.write_input("bad.toml", b"[encoding]\ngene_delimiter = \"\"\n")?;
    hognest_cmd()
        .arg("config")
        .arg("--config").arg(&bad_config)
        .assert()
        .code(2);

    Ok(())
}

#[test]
fn test_config_init_and_show() -> Result<()> {
    let env = TestEnvironment::new()?;
    let path = env.root().join("hognest.toml");

    hognest_cmd()
        .arg("config")
        .arg("--init").arg(&path)
        .assert()
        .success();
    assert!(path.exists());

    // Refuses to clobber without --force
    hognest_cmd()
        .arg("config")
        .arg("--init").arg(&path)
        .assert()
        .code(2);

    hognest_cmd()
        .arg("config")
        .arg("--config").arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("gene_delimiter = \"; \""))
        .stdout(predicate::str::contains("max_depth = 10000"));

    Ok(())
}
