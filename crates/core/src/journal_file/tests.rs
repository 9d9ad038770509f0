use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::tempdir;

use super::*;
use crate::types::{PetType, StatKind};

fn journal_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(name)
}

fn trait_pick(stat: StatKind) -> Command {
    Command::ApplyTrait { stat }
}

#[test]
fn header_and_records_load_back() {
    let dir = tempdir().unwrap();
    let path = journal_path(dir.path(), "session.jsonl");

    let mut writer = JournalWriter::create(&path, 42, "test-build", 99).unwrap();
    writer.append(0, Command::ChangePetType { pet: PetType::Ghost }).unwrap();
    writer.append(120, trait_pick(StatKind::Luck)).unwrap();
    writer.append(900, Command::Restart).unwrap();
    assert_eq!(writer.next_seq(), 3);

    let loaded = load_journal_from_file(&path).unwrap();
    let journal = &loaded.journal;
    assert_eq!(journal.format_version, JOURNAL_FORMAT_VERSION);
    assert_eq!(journal.build_id, "test-build");
    assert_eq!((journal.content_hash, journal.seed), (99, 42));

    let commands: Vec<(u64, u64, Command)> = journal
        .inputs
        .iter()
        .map(|record| (record.seq, record.tick_boundary, record.command))
        .collect();
    assert_eq!(
        commands,
        vec![
            (0, 0, Command::ChangePetType { pet: PetType::Ghost }),
            (1, 120, trait_pick(StatKind::Luck)),
            (2, 900, Command::Restart),
        ]
    );
    assert_eq!(loaded.next_seq, 3);
    assert_ne!(loaded.last_sha256_hex, CHAIN_ROOT);
}

#[test]
fn tampered_command_breaks_the_chain() {
    let dir = tempdir().unwrap();
    let path = journal_path(dir.path(), "tampered.jsonl");

    let mut writer = JournalWriter::create(&path, 1, "dev", 0).unwrap();
    writer.append(0, trait_pick(StatKind::Strength)).unwrap();
    writer.append(5, trait_pick(StatKind::Luck)).unwrap();

    let content = fs::read_to_string(&path).unwrap();
    let mut lines: Vec<String> = content.lines().map(String::from).collect();
    assert_eq!(lines.len(), 3);
    lines[2] = lines[2].replace("luck", "intelligence");
    fs::write(&path, lines.join("\n") + "\n").unwrap();

    let result = load_journal_from_file(&path);
    assert!(
        matches!(result, Err(JournalLoadError::HashChainBroken { line: 3 })),
        "expected hash chain broken at line 3, got: {result:?}"
    );
}

#[test]
fn deleted_record_is_detected() {
    let dir = tempdir().unwrap();
    let path = journal_path(dir.path(), "deleted.jsonl");

    let mut writer = JournalWriter::create(&path, 1, "dev", 0).unwrap();
    for (tick, stat) in [(0, StatKind::Strength), (5, StatKind::Dexterity), (9, StatKind::Luck)] {
        writer.append(tick, trait_pick(stat)).unwrap();
    }

    let content = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 4);
    fs::write(&path, format!("{}\n{}\n{}\n", lines[0], lines[1], lines[3])).unwrap();

    let result = load_journal_from_file(&path);
    assert!(
        matches!(result, Err(JournalLoadError::InvalidRecord { line: 3, .. })),
        "expected a sequence gap at line 3, got: {result:?}"
    );
}

#[test]
fn decreasing_tick_boundary_is_invalid() {
    let dir = tempdir().unwrap();
    let path = journal_path(dir.path(), "rewind.jsonl");

    let mut writer = JournalWriter::create(&path, 1, "dev", 0).unwrap();
    writer.append(50, Command::Restart).unwrap();
    writer.append(10, Command::Restart).unwrap();

    let result = load_journal_from_file(&path);
    assert!(
        matches!(result, Err(JournalLoadError::InvalidRecord { line: 3, .. })),
        "expected invalid record at line 3, got: {result:?}"
    );
}

#[test]
fn truncated_last_line_is_incomplete() {
    let dir = tempdir().unwrap();
    let path = journal_path(dir.path(), "truncated.jsonl");

    let mut writer = JournalWriter::create(&path, 1, "dev", 0).unwrap();
    writer.append(0, Command::Restart).unwrap();

    let mut file = OpenOptions::new().append(true).open(&path).unwrap();
    write!(file, "{{\"seq\":1,\"tick").unwrap();

    let result = load_journal_from_file(&path);
    assert!(
        matches!(result, Err(JournalLoadError::IncompleteLine { line: 3 })),
        "expected incomplete line at line 3, got: {result:?}"
    );
}

#[test]
fn empty_file_and_bad_header_are_errors() {
    let dir = tempdir().unwrap();
    let empty = journal_path(dir.path(), "empty.jsonl");
    fs::write(&empty, "").unwrap();
    assert!(matches!(load_journal_from_file(&empty), Err(JournalLoadError::EmptyFile)));

    let garbage = journal_path(dir.path(), "garbage.jsonl");
    fs::write(&garbage, "not valid json\n").unwrap();
    assert!(matches!(
        load_journal_from_file(&garbage),
        Err(JournalLoadError::InvalidHeader { line: 1, .. })
    ));

    let missing = journal_path(dir.path(), "missing.jsonl");
    let result = load_journal_from_file(&missing);
    assert!(matches!(result, Err(JournalLoadError::Io(_))), "got: {result:?}");
}

#[test]
fn header_only_file_loads_empty_journal() {
    let dir = tempdir().unwrap();
    let path = journal_path(dir.path(), "header_only.jsonl");
    let _writer = JournalWriter::create(&path, 555, "dev", 0).unwrap();

    let loaded = load_journal_from_file(&path).unwrap();
    assert_eq!(loaded.journal.seed, 555);
    assert!(loaded.journal.inputs.is_empty());
    assert_eq!(loaded.next_seq, 0);
    assert_eq!(loaded.last_sha256_hex, CHAIN_ROOT);
}

#[test]
fn resumed_writer_continues_the_chain() {
    let dir = tempdir().unwrap();
    let path = journal_path(dir.path(), "resume.jsonl");

    let mut writer = JournalWriter::create(&path, 1, "dev", 0).unwrap();
    writer.append(0, trait_pick(StatKind::Strength)).unwrap();
    drop(writer);

    let loaded = load_journal_from_file(&path).unwrap();
    let mut writer = JournalWriter::resume(&path, loaded.last_sha256_hex, loaded.next_seq).unwrap();
    writer.append(7, Command::ChangePetType { pet: PetType::Star }).unwrap();
    drop(writer);

    let reloaded = load_journal_from_file(&path).unwrap();
    assert_eq!(reloaded.journal.inputs.len(), 2);
    assert_eq!(reloaded.journal.inputs[1].seq, 1);
    assert_eq!(reloaded.journal.inputs[1].tick_boundary, 7);
    assert_eq!(reloaded.next_seq, 2);
}
