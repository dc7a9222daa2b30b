//! End-to-end tests over real files: folder conversion, ordered merge, patch.

use std::fs;
use std::path::Path;

use migratectl_core::{
    convert_file, convert_folder, convert_folder_with, merge_ordered, patch_column, BatchOptions, CsvTable,
    DependencyOrder, MergeOptions, MigrateError, PatchOptions,
};
use tempfile::TempDir;

fn write(dir: &Path, name: &str, contents: &str) {
    fs::write(dir.join(name), contents).unwrap();
}

#[test]
fn test_convert_file_one_statement_per_row() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "person_data.csv",
        "id,first_name,zip\n001,O'Brien,01234\n002,Lee,99999\n003,Ng,00001\n",
    );
    let out = dir.path().join("person_data.sql");

    let n = convert_file(&dir.path().join("person_data.csv"), "person", &out).unwrap();
    let sql = fs::read_to_string(&out).unwrap();

    assert_eq!(n, 3);
    assert_eq!(sql.lines().count(), 3);
    assert!(sql.ends_with(";\n"));
    assert_eq!(
        sql.lines().next().unwrap(),
        "INSERT INTO person (id, first_name, zip) VALUES ('001', 'O''Brien', '01234');"
    );
}

#[test]
fn test_convert_file_overwrites_existing_output() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "lab_data.csv", "id\n1\n");
    write(dir.path(), "lab_data.sql", "stale content\nmore stale content\n");
    let out = dir.path().join("lab_data.sql");

    convert_file(&dir.path().join("lab_data.csv"), "lab", &out).unwrap();

    assert_eq!(fs::read_to_string(&out).unwrap(), "INSERT INTO lab (id) VALUES ('1');\n");
}

#[test]
fn test_convert_missing_input_is_io_error() {
    let dir = TempDir::new().unwrap();
    let err = convert_file(
        &dir.path().join("absent.csv"),
        "absent",
        &dir.path().join("absent.sql"),
    )
    .unwrap_err();
    assert!(matches!(err, MigrateError::Io { .. }));
}

#[test]
fn test_convert_folder_derives_names_and_creates_output_dir() {
    let data = TempDir::new().unwrap();
    write(data.path(), "patient_records_data.csv", "id,name\n1,Ann\n");
    write(data.path(), "lab_data.csv", "id\n1\n2\n");
    write(data.path(), "notes.txt", "not a csv");
    fs::create_dir(data.path().join("nested.csv")).unwrap();

    let out_root = TempDir::new().unwrap();
    let out = out_root.path().join("sql").join("inserts");

    let report = convert_folder(data.path(), &out, &BatchOptions::default()).unwrap();

    let tables: Vec<_> = report.converted.iter().map(|c| c.table.as_str()).collect();
    assert_eq!(tables, vec!["lab", "patient_records"]);
    assert_eq!(report.total_statements(), 3);

    let patient_sql = fs::read_to_string(out.join("patient_records_data.sql")).unwrap();
    assert!(patient_sql.starts_with("INSERT INTO patient_records (id, name)"));
    assert!(out.join("lab_data.sql").exists());
    assert!(!out.join("notes.sql").exists());
}

#[test]
fn test_convert_folder_halts_on_bad_file_unless_keep_going() {
    let data = TempDir::new().unwrap();
    write(data.path(), "a_data.csv", "x,y\n1\n");
    write(data.path(), "b_data.csv", "x,y\n1,2\n");
    let out = TempDir::new().unwrap();

    let err = convert_folder(data.path(), out.path(), &BatchOptions::default()).unwrap_err();
    assert!(matches!(err, MigrateError::Csv { .. }));
    assert!(!out.path().join("b_data.sql").exists());

    let report = convert_folder(data.path(), out.path(), &BatchOptions { keep_going: true }).unwrap();
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.converted.len(), 1);
    assert_eq!(report.converted[0].table, "b");
}

#[test]
fn test_merge_respects_dependency_order_and_skips_missing() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "patient_data.sql", "INSERT INTO patient (id) VALUES ('p1');\n");
    write(dir.path(), "address_data.sql", "INSERT INTO address (id) VALUES ('a1');\n");
    write(dir.path(), "orphan_data.sql", "INSERT INTO orphan (id) VALUES ('o1');\n");

    let opts = MergeOptions {
        input_dir: dir.path().to_path_buf(),
        order: DependencyOrder::new(["address", "lab", "patient"]),
        ..Default::default()
    };
    let report = merge_ordered(&opts).unwrap();
    let merged = fs::read_to_string(dir.path().join("all_inserts_ordered.sql")).unwrap();

    assert_eq!(report.merged, vec!["address_data.sql", "patient_data.sql"]);
    assert_eq!(report.skipped, vec!["lab_data.sql"]);
    assert_eq!(report.unlisted, vec!["orphan_data.sql"]);

    let address_start = merged.find("-- Start of: address_data.sql").unwrap();
    let address_end = merged.find("-- End of: address_data.sql").unwrap();
    let patient_start = merged.find("-- Start of: patient_data.sql").unwrap();
    let patient_end = merged.find("-- End of: patient_data.sql").unwrap();
    assert!(address_start < address_end);
    assert!(address_end < patient_start);
    assert!(patient_start < patient_end);
    assert!(merged.find("VALUES ('a1')").unwrap() < merged.find("VALUES ('p1')").unwrap());
    assert!(!merged.contains("lab_data.sql"));
    assert!(!merged.contains("orphan"));
}

#[test]
fn test_merge_rerun_does_not_include_previous_output() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "address_data.sql", "INSERT INTO address (id) VALUES ('a1');\n");
    let opts = MergeOptions {
        input_dir: dir.path().to_path_buf(),
        order: DependencyOrder::new(["address"]),
        ..Default::default()
    };

    let first = merge_ordered(&opts).unwrap();
    let second = merge_ordered(&opts).unwrap();

    assert_eq!(first, second);
    let merged = fs::read_to_string(&second.output).unwrap();
    assert_eq!(merged.matches("-- Start of:").count(), 1);
}

#[test]
fn test_patch_column_writes_shorter_length_with_first_header() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "treatment_medication_data.csv",
        "medication_code,treatment_id\nM-1,T1\nM-2,T2\nM-3,T3\n",
    );
    write(
        dir.path(),
        "medication_data.csv",
        "treatment_id,medication_code\nX1,old\nX2,old\n",
    );
    let out = dir.path().join("patched.csv");

    let report = patch_column(
        &dir.path().join("treatment_medication_data.csv"),
        &dir.path().join("medication_data.csv"),
        &out,
        &PatchOptions::positional("medication_code"),
    )
    .unwrap();

    assert_eq!(report.written, 2);
    assert_eq!(report.unpaired_first, 1);

    let written = CsvTable::read(&out).unwrap();
    assert_eq!(written.header, vec!["medication_code", "treatment_id"]);
    assert_eq!(written.records.len(), 2);
    assert_eq!(written.records[0].get("medication_code"), Some("M-1"));
    assert_eq!(written.records[1].get("medication_code"), Some("M-2"));
    assert_eq!(written.records[0].get("treatment_id"), Some("X1"));
    assert_eq!(written.records[1].get("treatment_id"), Some("X2"));
}

#[test]
fn test_patch_rejects_columns_outside_first_header() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "a.csv", "code\nA\n");
    write(dir.path(), "b.csv", "code,extra\nB,e\n");

    let err = patch_column(
        &dir.path().join("a.csv"),
        &dir.path().join("b.csv"),
        &dir.path().join("out.csv"),
        &PatchOptions::positional("code"),
    )
    .unwrap_err();

    assert!(matches!(err, MigrateError::UnexpectedColumn { ref column } if column == "extra"));
}

#[test]
fn test_merge_refuses_output_that_is_also_an_input() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "address_data.sql", "INSERT INTO address (id) VALUES ('a1');\n");
    write(dir.path(), "patient_data.sql", "INSERT INTO patient (id) VALUES ('p1');\n");

    let opts = MergeOptions {
        input_dir: dir.path().to_path_buf(),
        output: "patient_data.sql".into(),
        order: DependencyOrder::new(["address", "patient"]),
        ..Default::default()
    };
    let err = merge_ordered(&opts).unwrap_err();

    assert!(matches!(err, MigrateError::Config { .. }));
    assert_eq!(
        fs::read_to_string(dir.path().join("patient_data.sql")).unwrap(),
        "INSERT INTO patient (id) VALUES ('p1');\n"
    );
}

#[test]
fn test_patch_failure_over_second_file_keeps_it_intact() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "a.csv", "code\nA\n");
    write(dir.path(), "b.csv", "code,extra\nB,e\n");
    let second = dir.path().join("b.csv");

    let err = patch_column(
        &dir.path().join("a.csv"),
        &second,
        &second,
        &PatchOptions::positional("code"),
    )
    .unwrap_err();

    assert!(matches!(err, MigrateError::UnexpectedColumn { .. }));
    assert_eq!(fs::read_to_string(&second).unwrap(), "code,extra\nB,e\n");
}

#[test]
fn test_patch_can_write_back_over_second_file() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "a.csv", "id,code\n1,A\n2,B\n");
    write(dir.path(), "b.csv", "id,code\n7,x\n8,y\n");
    let second = dir.path().join("b.csv");

    patch_column(&dir.path().join("a.csv"), &second, &second, &PatchOptions::positional("code")).unwrap();

    assert_eq!(fs::read_to_string(&second).unwrap(), "id,code\n7,A\n8,B\n");
}

#[test]
fn test_convert_folder_reports_each_file_as_it_converts() {
    let data = TempDir::new().unwrap();
    write(data.path(), "a_data.csv", "x\n1\n");
    write(data.path(), "b_data.csv", "x,y\n1\n");
    write(data.path(), "c_data.csv", "x\n1\n");
    let out = TempDir::new().unwrap();

    let mut seen = Vec::new();
    let err = convert_folder_with(data.path(), out.path(), &BatchOptions::default(), |conversion| {
        seen.push(conversion.table.clone())
    })
    .unwrap_err();

    assert!(matches!(err, MigrateError::Csv { .. }));
    assert_eq!(seen, vec!["a"]);
}
