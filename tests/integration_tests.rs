use anyhow::Result;
use regex_sweep::domain::model::{Engine, OutputFormat, WorkloadKind};
use regex_sweep::{CliConfig, LocalStorage, SweepEngine, SweepPipeline, TomlConfig};
use tempfile::TempDir;

fn small_sweep(format: OutputFormat, output: String) -> CliConfig {
    CliConfig {
        end: 40,
        repetitions: 2,
        format,
        output: Some(output),
        ..CliConfig::default()
    }
}

#[test]
fn test_end_to_end_csv_report() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let output = temp_dir.path().join("sweep.csv");
    let config = small_sweep(OutputFormat::Csv, output.to_str().unwrap().to_string());

    let pipeline = SweepPipeline::new(LocalStorage::default(), config);
    let engine = SweepEngine::new_with_monitoring(pipeline, false);
    let destination = engine.run()?;

    assert_eq!(destination, output.to_str().unwrap());

    let mut reader = csv::Reader::from_path(&output)?;
    let headers = reader.headers()?.clone();
    assert_eq!(&headers[3], "n");

    let rows: Vec<csv::StringRecord> = reader.records().collect::<std::result::Result<_, _>>()?;
    let sizes: Vec<&str> = rows.iter().map(|r| r.get(3).unwrap()).collect();
    assert_eq!(sizes, vec!["0", "10", "20", "30"]);
    for row in &rows {
        assert_eq!(row.get(1), Some("regex"));
        assert_eq!(row.get(2), Some("star-star"));
        assert_eq!(row.get(4), Some("2"));
        assert_eq!(row.get(8), Some("None"));
    }

    Ok(())
}

#[test]
fn test_end_to_end_json_report_with_monitoring() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let output = temp_dir.path().join("nested/sweep.json");
    let config = CliConfig {
        workload: WorkloadKind::Alternation,
        engine: Engine::Pikevm,
        ..small_sweep(OutputFormat::Json, output.to_str().unwrap().to_string())
    };

    let pipeline = SweepPipeline::new(LocalStorage::default(), config);
    let engine = SweepEngine::new_with_monitoring(pipeline, true);
    engine.run()?;

    let value: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&output)?)?;
    let report = &value[0];
    assert_eq!(report["engine"], "pikevm");
    assert_eq!(report["workload"], "alternation");
    assert_eq!(report["stopped_early"], false);

    let measurements = report["measurements"].as_array().unwrap();
    assert_eq!(measurements.len(), 4);
    for m in measurements {
        let n = m["n"].as_u64().unwrap();
        let outcome = &m["samples"][0]["outcome"];
        assert_eq!(outcome["kind"], "matched");
        assert_eq!(outcome["end"].as_u64(), Some(n));
        assert_eq!(m["samples"].as_array().unwrap().len(), 2);
    }

    Ok(())
}

#[test]
fn test_toml_experiments_run_in_order() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let output = temp_dir.path().join("all.txt");
    let toml_content = format!(
        r#"
[output]
format = "text"
path = "{}"
quiet_matches = true

[[experiment]]
name = "first"
end = 20

[[experiment]]
name = "second"
workload = "while-program"
start = 1
end = 3
step = 1
repetitions = 1
"#,
        output.to_str().unwrap().replace('\\', "\\\\")
    );

    let config = TomlConfig::from_toml_str(&toml_content)?;
    let pipeline = SweepPipeline::new(LocalStorage::default(), config);
    SweepEngine::new(pipeline).run()?;

    let text = std::fs::read_to_string(&output)?;
    let first = text.find("# first:").unwrap();
    let second = text.find("# second:").unwrap();
    assert!(first < second);
    assert!(text.contains("# second: while-program on regex (tokenize)"));
    assert_eq!(text.matches(" Time: ").count(), 4);
    assert!(!text.contains("None"));

    Ok(())
}

#[test]
fn test_invalid_pattern_fails_the_run() {
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("never.csv");
    let config = CliConfig {
        workload: WorkloadKind::Custom,
        pattern: Some("(a{{n}}".to_string()),
        unit: Some("a".to_string()),
        ..small_sweep(OutputFormat::Csv, output.to_str().unwrap().to_string())
    };

    let pipeline = SweepPipeline::new(LocalStorage::default(), config);
    let result = SweepEngine::new(pipeline).run();

    assert!(matches!(result, Err(regex_sweep::SweepError::PatternError { .. })));
    assert!(!output.exists());
}
