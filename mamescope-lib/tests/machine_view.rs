use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use mamescope_core::MachineType;
use mamescope_lib::{Error, Mame, MameSettings};

const LISTXML: &str = r#"<?xml version="1.0"?>
<mame build="0.260">
    <machine name="sysbios" isbios="yes">
        <description>The System BIOS</description>
        <year>1991</year>
        <manufacturer>BIOS Corp</manufacturer>
    </machine>
    <machine name="parentgm" romof="sysbios">
        <description>Parent Game</description>
        <year>1992</year>
        <manufacturer>Maker</manufacturer>
        <input players="2" coins="2"/>
        <driver status="good" emulation="good" savestate="supported"/>
    </machine>
    <machine name="clonegm" cloneof="parentgm" romof="parentgm">
        <description>Clone Game</description>
        <year>1993</year>
        <manufacturer>Maker</manufacturer>
        <input players="2" coins="2"/>
        <driver status="imperfect" emulation="good" savestate="unsupported"/>
    </machine>
    <machine name="orphan" cloneof="gone" romof="gone">
        <description>Orphan Game</description>
    </machine>
    <machine name="coinop">
        <description>Coin Op Game</description>
        <input players="1" coins="1"/>
    </machine>
    <machine name="mechgm" ismechanical="yes">
        <description>Mech Game</description>
    </machine>
    <machine name="gnw">
        <description>Game &amp; Watch: Ball</description>
    </machine>
    <machine name="xrated">
        <description>Adults Only Game</description>
    </machine>
    <machine name="adevice" isdevice="yes" runnable="no">
        <description>Some Device</description>
    </machine>
</mame>"#;

fn write_file(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    let mut file = std::fs::File::create(path).unwrap();
    file.write_all(contents.as_bytes()).unwrap();
}

/// Build a full on-disk test environment and settings pointing at it.
fn test_settings(root: &Path) -> MameSettings {
    write_file(&root.join("machines.xml"), LISTXML);

    let cats = root.join("cats");
    write_file(
        &cats.join("catlist.ini"),
        "[Arcade: Maze / Collect * Mature]\nparentgm\n[Arcade: System / BIOS]\nsysbios\n",
    );
    write_file(&cats.join("series.ini"), "[Pac-Man]\nparentgm\n");
    write_file(&cats.join("mature.ini"), "[Mature]\nxrated\n");
    write_file(&cats.join("not_mature.ini"), "[Not Mature]\ncoinop\n");
    write_file(&cats.join("version.ini"), "[0.37b5]\nparentgm\n");
    write_file(&cats.join("bestgames.ini"), "[70 to 80 (Good)]\nparentgm\n");
    write_file(&cats.join("nplayers.ini"), "[NPlayers]\nparentgm = 2P alt\n");

    let dats = root.join("dats");
    write_file(
        &dats.join("history.xml"),
        r#"<history version="2.60">
            <entry>
                <systems><system name="parentgm"/></systems>
                <text>Arcade published 30 years ago: A parent game.
- TECHNICAL -
Two buttons.</text>
            </entry>
        </history>"#,
    );
    write_file(
        &dats.join("mameinfo.dat"),
        "$info=parentgm\n$mame\n0.37b5 [Someone]\n\nWIP:\n- 0.250: Fixed\n$end\n",
    );
    write_file(
        &dats.join("messinfo.dat"),
        "$info=parentgm\n$mame\nShort summary.\nDRIVER: all the driver stuff\n$end\n",
    );

    let ui = root.join("ui");
    let mut favourites_lines: Vec<String> = Vec::new();
    favourites_lines.extend(["[favorite]", "", "mame"].map(String::from));
    favourites_lines.push("parentgm".to_string());
    favourites_lines.extend(std::iter::repeat_n(String::new(), 12));
    write_file(&ui.join("favorites.ini"), &favourites_lines.join("\n"));

    let cfg = root.join("cfg");
    write_file(
        &cfg.join("parentgm.cfg"),
        r#"<mameconfig version="10"><system name="parentgm"><counters><coins index="0" number="11"/><tickets number="44"/></counters></system></mameconfig>"#,
    );

    MameSettings {
        mame_executable_path: root.join("mame"),
        xml_path: Some(root.join("machines.xml")),
        cat_path: Some(cats),
        dats_path: Some(dats),
        ui_path: Some(ui),
        configs_path: Some(cfg),
        plugin_config_home: Some(root.join("plugins")),
        list_software_from_file: true,
        ..Default::default()
    }
}

#[test]
fn bios_self_reference_resolves_through_parent() {
    let dir = tempfile::tempdir().unwrap();
    let mame = Mame::new(test_settings(dir.path()));

    // clonegm's romof repeats its parent basename; the effective BIOS must
    // be the parent's BIOS, not the parent itself
    let clone = mame.get_machine("clonegm").unwrap();
    assert_eq!(clone.parent_basename(), Some("parentgm"));
    assert_eq!(clone.bios_basename(), Some("sysbios"));
    assert_eq!(clone.bios_name(), Some("The System BIOS"));

    let parent = mame.get_machine("parentgm").unwrap();
    assert_eq!(parent.bios_basename(), Some("sysbios"));
}

#[test]
fn missing_parent_degrades_to_absent() {
    let dir = tempfile::tempdir().unwrap();
    let mame = Mame::new(test_settings(dir.path()));

    let orphan = mame.get_machine("orphan").unwrap();
    assert_eq!(orphan.parent_basename(), Some("gone"));
    assert!(orphan.parent().is_none());
    // Its romof equals the dangling cloneof, so the BIOS degrades too
    assert_eq!(orphan.bios_basename(), None);
    assert!(orphan.bios().is_none());
}

#[test]
fn machine_type_precedence() {
    let dir = tempfile::tempdir().unwrap();
    let mame = Mame::new(test_settings(dir.path()));

    // Display-name platform marker wins over everything
    let gnw = mame.get_machine("gnw").unwrap();
    assert_eq!(gnw.machine_type(), MachineType::LcdHandheld);
    assert_eq!(gnw.platform(), "Game & Watch");

    // BIOS flag beats the catlist classification
    let bios = mame.get_machine("sysbios").unwrap();
    assert_eq!(bios.machine_type(), MachineType::Bios);

    // Catlist classification
    let parent = mame.get_machine("parentgm").unwrap();
    assert_eq!(parent.machine_type(), MachineType::Arcade);
    assert_eq!(parent.genre(), Some("Maze"));
    assert_eq!(parent.subgenre(), Some("Collect"));

    // No catlist entry: coin slots make it an arcade machine
    let coinop = mame.get_machine("coinop").unwrap();
    assert_eq!(coinop.machine_type(), MachineType::Arcade);

    // No catlist, no coin slots, mechanical flag
    let mech = mame.get_machine("mechgm").unwrap();
    assert_eq!(mech.machine_type(), MachineType::Mechanical);
}

#[test]
fn clone_falls_back_to_parent_categories() {
    let dir = tempfile::tempdir().unwrap();
    let mame = Mame::new(test_settings(dir.path()));

    let clone = mame.get_machine("clonegm").unwrap();
    assert_eq!(clone.catlist_full(), Some("Arcade: Maze / Collect * Mature"));
    assert_eq!(clone.genre(), Some("Maze"));
    assert_eq!(clone.series(), vec!["Pac-Man".to_string()]);
    assert_eq!(clone.version_added(), Some("0.37b5".to_string()));
    assert_eq!(clone.bestgames_rating(), Some(80));
}

#[test]
fn maturity_resolution_order() {
    let dir = tempfile::tempdir().unwrap();
    let mame = Mame::new(test_settings(dir.path()));

    // Explicit category hits
    assert_eq!(mame.get_machine("xrated").unwrap().is_mature(), Some(true));
    assert_eq!(mame.get_machine("coinop").unwrap().is_mature(), Some(false));
    // Catlist flag fallback (through the parent's catlist entry)
    assert_eq!(mame.get_machine("clonegm").unwrap().is_mature(), Some(true));
    // Nothing known at all
    assert_eq!(mame.get_machine("mechgm").unwrap().is_mature(), None);
}

#[test]
fn play_time_defaults_to_zero_not_none() {
    let dir = tempfile::tempdir().unwrap();
    // plugin_config_home is set but no timer.db exists underneath it
    let mame = Mame::new(test_settings(dir.path()));

    let machine = mame.get_machine("parentgm").unwrap();
    assert_eq!(machine.total_time_played(), Duration::ZERO);
    assert_eq!(machine.play_count(), 0);
    assert_eq!(machine.total_time_emulated(), Duration::ZERO);
}

#[test]
fn history_and_dat_documentation() {
    let dir = tempfile::tempdir().unwrap();
    let mame = Mame::new(test_settings(dir.path()));

    let parent = mame.get_machine("parentgm").unwrap();
    let history = parent.get_history().unwrap();
    assert_eq!(history.entry_type(), Some("Arcade"));
    assert_eq!(history.age(), Some(30));
    assert_eq!(history.description(), Some("A parent game."));
    assert_eq!(history.technical_info(), Some("Two buttons."));

    let mameinfo = parent.get_mameinfo().unwrap();
    assert_eq!(mameinfo.summary(), Some("0.37b5 [Someone]"));
    assert_eq!(mameinfo.section("WIP"), Some("0.250: Fixed"));

    assert_eq!(
        parent.get_messinfo_summary(),
        Some("Short summary.".to_string())
    );

    // No entries for the clone, and no history fallback for machines
    let clone = mame.get_machine("clonegm").unwrap();
    assert!(clone.get_history().is_none());
    assert!(clone.get_mameinfo().is_none());
}

#[test]
fn favourites_and_counters() {
    let dir = tempfile::tempdir().unwrap();
    let mame = Mame::new(test_settings(dir.path()));

    let parent = mame.get_machine("parentgm").unwrap();
    assert!(parent.is_favourite());
    assert_eq!(parent.tickets_dispensed(), Some(44));
    assert_eq!(parent.total_coins_inserted(), Some(11));

    let clone = mame.get_machine("clonegm").unwrap();
    assert!(!clone.is_favourite());
    assert_eq!(clone.tickets_dispensed(), None);
}

#[test]
fn nplayers_description() {
    let dir = tempfile::tempdir().unwrap();
    let mame = Mame::new(test_settings(dir.path()));

    let parent = mame.get_machine("parentgm").unwrap();
    assert_eq!(parent.number_of_players_description(), "2P alt");
    let coinop = mame.get_machine("coinop").unwrap();
    assert_eq!(coinop.number_of_players_description(), "1");
}

#[test]
fn unknown_basename_is_a_hard_failure() {
    let dir = tempfile::tempdir().unwrap();
    let mame = Mame::new(test_settings(dir.path()));

    match mame.get_machine("nonsense") {
        Err(Error::MachineNotFound(name)) => assert_eq!(name, "nonsense"),
        other => panic!("expected MachineNotFound, got {:?}", other.map(|m| m.to_string())),
    }
}

#[test]
fn loads_are_cached_per_path() {
    let dir = tempfile::tempdir().unwrap();
    let mame = Mame::new(test_settings(dir.path()));

    let first = mame.get_machine("parentgm").unwrap();
    let second = mame.get_machine("parentgm").unwrap();
    // Same Arc'd record — the listing file was parsed once
    assert!(Arc::ptr_eq(first.record(), second.record()));

    let folder_a = mame.category_folder().unwrap();
    let folder_b = mame.category_folder().unwrap();
    assert!(Arc::ptr_eq(&folder_a, &folder_b));
}

#[test]
fn fresh_cache_means_fresh_state() {
    let dir = tempfile::tempdir().unwrap();
    let settings = test_settings(dir.path());

    let first = Mame::new(settings.clone());
    let second = Mame::new(settings);
    let folder_a = first.category_folder().unwrap();
    let folder_b = second.category_folder().unwrap();
    assert!(!Arc::ptr_eq(&folder_a, &folder_b));
}

#[test]
fn iteration_skips_devices_when_asked() {
    let dir = tempfile::tempdir().unwrap();
    let mame = Mame::new(test_settings(dir.path()));

    let all: Vec<String> = mame
        .iter_machines()
        .unwrap()
        .map(|m| m.basename().to_string())
        .collect();
    assert!(all.contains(&"adevice".to_string()));
    assert_eq!(all.len(), 9);

    let runnable: Vec<String> = mame
        .iter_runnable_machines()
        .unwrap()
        .map(|m| m.basename().to_string())
        .collect();
    assert!(!runnable.contains(&"adevice".to_string()));
    assert_eq!(runnable.len(), 8);
}

#[tokio::test]
async fn async_surface_matches_blocking_surface() {
    let dir = tempfile::tempdir().unwrap();
    let mame = Mame::new(test_settings(dir.path()));

    let sync_clone = mame.get_machine("clonegm").unwrap();
    let async_clone = mame.get_machine_async("clonegm").await.unwrap();

    // The single-hop BIOS correction must come out identically
    assert_eq!(sync_clone.bios_basename(), async_clone.bios_basename());
    assert_eq!(sync_clone.machine_type(), async_clone.machine_type());
    assert_eq!(sync_clone.genre(), async_clone.genre());
    assert_eq!(sync_clone.is_mature(), async_clone.is_mature());
    assert_eq!(sync_clone.play_count(), async_clone.play_count());

    let sync_history = sync_clone.get_history();
    let async_history = async_clone.get_history_async().await;
    assert_eq!(sync_history.is_none(), async_history.is_none());
}
