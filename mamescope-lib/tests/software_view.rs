use std::io::Write;
use std::path::Path;
use std::time::Duration;

use mamescope_core::SoftwareSupport;
use mamescope_lib::{Error, Mame, MameSettings};

const SOFTLIST: &str = r#"<?xml version="1.0"?>
<softwarelist name="nes" description="Nintendo Entertainment System cartridges">
    <software name="smb">
        <description>Super Mario Bros.</description>
        <year>1985</year>
        <publisher>Nintendo</publisher>
        <info name="serial" value="NES-SM-USA"/>
        <part name="cart" interface="nes_cart">
            <feature name="slot" value="nrom"/>
            <dataarea name="prg" size="32768">
                <rom name="smb-prg" size="32768" crc="5cf548d3"/>
            </dataarea>
        </part>
    </software>
    <software name="smbb" cloneof="smb" supported="partial">
        <description>Super Mario Bros. (bootleg)</description>
        <year>1986</year>
        <publisher>&lt;bootleg&gt;</publisher>
        <notes>  Glitchy  </notes>
        <part name="cart" interface="nes_cart"/>
    </software>
</softwarelist>"#;

fn write_file(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    let mut file = std::fs::File::create(path).unwrap();
    file.write_all(contents.as_bytes()).unwrap();
}

fn test_settings(root: &Path) -> MameSettings {
    let hashes = root.join("hash");
    write_file(&hashes.join("nes.xml"), SOFTLIST);

    let dats = root.join("dats");
    write_file(
        &dats.join("history.xml"),
        r#"<history version="2.60">
            <entry>
                <software><item list="nes" name="smb"/></software>
                <text>Console published 38 years ago: The plumber game.</text>
            </entry>
        </history>"#,
    );

    MameSettings {
        mame_executable_path: root.join("mame"),
        hash_paths: vec![hashes],
        dats_path: Some(dats),
        plugin_config_home: Some(root.join("plugins")),
        list_software_from_file: true,
        ..Default::default()
    }
}

#[test]
fn software_identity_and_fields() {
    let dir = tempfile::tempdir().unwrap();
    let mame = Mame::new(test_settings(dir.path()));

    let list = mame.get_software_list("nes").unwrap();
    assert_eq!(list.basename(), "nes");
    assert_eq!(list.grouping(), "nes");
    assert_eq!(list.list_type(), None);
    assert_eq!(list.software_count(), 2);

    let smb = mame.get_software("nes", "smb").unwrap();
    assert_eq!(smb.id(), "nes:smb");
    assert_eq!(smb.name(), "Super Mario Bros.");
    assert_eq!(smb.year(), Some(1985));
    assert_eq!(smb.publisher(), Some("Nintendo"));
    assert_eq!(smb.get_info("serial"), Some("NES-SM-USA"));
    assert_eq!(smb.supported(), SoftwareSupport::Supported);
    assert_eq!(smb.get_only_part().unwrap().feature("slot"), Some("nrom"));
}

#[test]
fn clone_resolution_and_notes() {
    let dir = tempfile::tempdir().unwrap();
    let mame = Mame::new(test_settings(dir.path()));

    let bootleg = mame.get_software("nes", "smbb").unwrap();
    assert_eq!(bootleg.parent_basename(), Some("smb"));
    assert_eq!(bootleg.parent_name(), Some("Super Mario Bros.".to_string()));
    assert_eq!(bootleg.supported(), SoftwareSupport::Partial);
    assert_eq!(bootleg.notes(), Some("Glitchy"));
}

#[test]
fn software_history_falls_back_to_parent() {
    let dir = tempfile::tempdir().unwrap();
    let mame = Mame::new(test_settings(dir.path()));

    let smb = mame.get_software("nes", "smb").unwrap();
    assert_eq!(
        smb.history().unwrap().description(),
        Some("The plumber game.")
    );

    // The bootleg has no entry of its own, so its parent's is used
    let bootleg = mame.get_software("nes", "smbb").unwrap();
    assert_eq!(
        bootleg.history().unwrap().description(),
        Some("The plumber game.")
    );
}

#[test]
fn software_play_time_defaults_to_zero() {
    let dir = tempfile::tempdir().unwrap();
    let mame = Mame::new(test_settings(dir.path()));

    let smb = mame.get_software("nes", "smb").unwrap();
    assert_eq!(smb.total_time_played(), Duration::ZERO);
    assert_eq!(smb.play_count(), 0);
}

#[test]
fn unknown_software_is_a_hard_failure() {
    let dir = tempfile::tempdir().unwrap();
    let mame = Mame::new(test_settings(dir.path()));

    match mame.get_software("nes", "nonsense") {
        Err(Error::SoftwareNotFound { list, basename }) => {
            assert_eq!(list, "nes");
            assert_eq!(basename, "nonsense");
        }
        other => panic!("expected SoftwareNotFound, got {:?}", other.map(|s| s.id())),
    }

    match mame.get_software_list("gameboy") {
        Err(Error::SoftwareListNotFound(name)) => assert_eq!(name, "gameboy"),
        other => panic!("expected SoftwareListNotFound, got {:?}", other.map(|l| l.basename().to_string())),
    }
}

#[tokio::test]
async fn async_software_surface_matches_blocking() {
    let dir = tempfile::tempdir().unwrap();
    let mame = Mame::new(test_settings(dir.path()));

    let sync_smb = mame.get_software("nes", "smb").unwrap();
    let async_smb = mame.get_software_async("nes", "smb").await.unwrap();
    assert_eq!(sync_smb.id(), async_smb.id());
    assert_eq!(sync_smb.name(), async_smb.name());

    let sync_history = sync_smb.history().unwrap();
    let async_history = async_smb.history_async().await.unwrap();
    assert_eq!(sync_history.description(), async_history.description());
}
