use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn get_input_path(filename: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests/mq2");
    path.push(filename);
    path
}

#[test]
fn command_mapqtl_session() -> anyhow::Result<()> {
    let temp = TempDir::new()?;

    let mut cmd = Command::cargo_bin("mq2")?;
    cmd.arg("mapqtl")
        // given out of order on purpose
        .arg(get_input_path("Session 2 (IM)_trait2.mqo"))
        .arg(get_input_path("Session 2 (IM)_trait1.mqo"))
        .arg(get_input_path("Session 3 (IM)_trait1.mqo"))
        .arg("--session")
        .arg("2")
        .arg("--lod")
        .arg("3")
        .arg("-o")
        .arg(temp.path())
        .assert()
        .success();

    let qtls = fs::read_to_string(temp.path().join("qtls.csv"))?;
    assert_eq!(
        qtls,
        "\
Trait,Group,Marker,LOD,Position
trait1,1,,4.2,7.5
trait1,2,m6,3.1,16.0
trait1,U,m7,5,0.0
trait2,2,m5,4,8.0
"
    );

    let matrix = fs::read_to_string(temp.path().join("qtls_matrix.csv"))?;
    assert_eq!(
        matrix,
        "\
Locus,Group,Position,trait1,trait2,# QTLs
m1,1,0.0,0.8,0.1,0
m2,1,5.0,3.6,0.2,1
,1,7.5,4.2,0.3,1
m3,1,10.0,2.9,0.4,0
m4,2,0.0,1.0,3.5,1
m5,2,8.0,2.5,4.0,1
m6,2,16.0,3.1,2.0,1
m7,U,0.0,5.0,0.0,1
"
    );

    let map = fs::read_to_string(temp.path().join("map.csv"))?;
    assert_eq!(map.lines().count(), 8);
    assert!(map.starts_with("Locus,Group,Position\nm1,1,0.0\n"));
    assert!(!map.contains(",1,7.5"));

    let map_qtls = fs::read_to_string(temp.path().join("map_with_qtls.csv"))?;
    assert!(map_qtls.contains("Locus,Group,Position,# QTLs\n"));
    assert!(map_qtls.contains("m2,1,5.0,1\n"));
    assert!(map_qtls.contains("m3,1,10.0,0\n"));
    assert!(map_qtls.contains("m5,2,8.0,1\n"));

    let qtls_mk = fs::read_to_string(temp.path().join("qtls_with_mk.csv"))?;
    assert_eq!(
        qtls_mk,
        "\
Trait,Group,Marker,LOD,Position,Closest marker,Start marker,Stop marker
trait1,1,,4.2,7.5,m2,m2,m3
trait1,2,m6,3.1,16.0,m6,m5,m6
trait1,U,m7,5,0.0,m7,m7,m7
trait2,2,m5,4,8.0,m5,m4,m6
"
    );

    let mapchart = fs::read_to_string(temp.path().join("MapChart.map"))?;
    assert_eq!(
        mapchart,
        "\
group 1
m1  0.0
m2  5.0
m3  10.0

qtls
trait1   5.0 7.5 7.5 10.0

group 2
m4  0.0
m5  8.0
m6  16.0

qtls
trait1   8.0 16.0 16.0 16.0
trait2   0.0 8.0 8.0 16.0

"
    );

    Ok(())
}

#[test]
fn command_mapqtl_higher_lod() -> anyhow::Result<()> {
    let temp = TempDir::new()?;

    let mut cmd = Command::cargo_bin("mq2")?;
    cmd.arg("mapqtl")
        .arg(get_input_path("Session 2 (IM)_trait1.mqo"))
        .arg(get_input_path("Session 2 (IM)_trait2.mqo"))
        .arg("--lod")
        .arg("4.2")
        .arg("-o")
        .arg(temp.path())
        .assert()
        .success();

    let qtls = fs::read_to_string(temp.path().join("qtls.csv"))?;
    assert_eq!(qtls, "Trait,Group,Marker,LOD,Position\ntrait1,U,m7,5,0.0\n");

    let mapchart = fs::read_to_string(temp.path().join("MapChart.map"))?;
    assert!(!mapchart.contains("qtls"));
    assert!(!mapchart.contains("group U"));

    Ok(())
}

#[test]
fn command_mapqtl_map_mismatch() -> anyhow::Result<()> {
    let temp = TempDir::new()?;
    let outdir = temp.path().join("out");

    let mut cmd = Command::cargo_bin("mq2")?;
    cmd.arg("mapqtl")
        .arg(get_input_path("Session 3 (IM)_trait1.mqo"))
        .arg(get_input_path("Session 3 (IM)_trait2.mqo"))
        .arg("-o")
        .arg(&outdir)
        .assert()
        .failure()
        .stderr(predicate::str::contains("trait2"))
        .stderr(predicate::str::contains("does not correspond"));

    assert!(!outdir.exists());

    Ok(())
}

#[test]
fn command_mapqtl_not_lod() -> anyhow::Result<()> {
    let temp = TempDir::new()?;

    let mut cmd = Command::cargo_bin("mq2")?;
    cmd.arg("mapqtl")
        .arg(get_input_path("Session 4 (KW)_trait1.mqo"))
        .arg("-o")
        .arg(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Kruskal-Wallis"));

    assert!(!temp.path().join("qtls.csv").exists());

    Ok(())
}

#[test]
fn command_mapqtl_bad_threshold() -> anyhow::Result<()> {
    let temp = TempDir::new()?;

    let mut cmd = Command::cargo_bin("mq2")?;
    cmd.arg("mapqtl")
        .arg(get_input_path("Session 2 (IM)_trait1.mqo"))
        .arg("--lod")
        .arg("three")
        .arg("-o")
        .arg(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("LOD threshold should be a number"));

    Ok(())
}

#[test]
fn command_mapqtl_unknown_session() -> anyhow::Result<()> {
    let mut cmd = Command::cargo_bin("mq2")?;
    cmd.arg("mapqtl")
        .arg(get_input_path("Session 2 (IM)_trait1.mqo"))
        .arg("--session")
        .arg("9")
        .assert()
        .failure()
        .stderr(predicate::str::contains("session \"9\""));

    Ok(())
}
