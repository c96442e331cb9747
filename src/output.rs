// src/output.rs
use crate::error::Result;
use crate::pool::ResultSink;
use crate::types::{DnsSearchError, OutputConfig, OutputFormat, ProbeResult, RecordTypes, RunStats};
use colored::Colorize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Renders findings as text, JSON lines or CSV to stdout or a file.
pub struct OutputManager {
    config: OutputConfig,
    records: RecordTypes,
    writer: Box<dyn Write + Send>,
    header_written: bool,
}

impl OutputManager {
    pub fn new(config: OutputConfig, records: RecordTypes) -> Result<Self> {
        let writer: Box<dyn Write + Send> = match &config.file {
            Some(file_path) => Box::new(BufWriter::new(Self::create_file(file_path)?)),
            None => Box::new(BufWriter::new(std::io::stdout())),
        };

        Ok(Self::with_writer(config, records, writer))
    }

    pub fn with_writer(config: OutputConfig, records: RecordTypes, writer: Box<dyn Write + Send>) -> Self {
        Self {
            config,
            records,
            writer,
            header_written: false,
        }
    }

    fn create_file(file_path: &str) -> Result<File> {
        if let Some(parent) = Path::new(file_path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| DnsSearchError::OutputError(format!("Failed to create directory: {}", e)))?;
            }
        }

        File::create(file_path)
            .map_err(|e| DnsSearchError::OutputError(format!("Failed to create file: {}", e)))
    }

    fn use_color(&self) -> bool {
        self.config.color && self.config.file.is_none()
    }

    fn write_text(&mut self, result: &ProbeResult) -> Result<()> {
        let hostname = format!("{:>25}", result.hostname);
        let mut line = if self.use_color() {
            hostname.green().to_string()
        } else {
            hostname
        };

        if self.records.a {
            line.push_str(&format!(" : A [{}]", result.addresses.join(" ")));
        }
        if self.records.txt {
            line.push_str(&format!(" : TXT [{}]", result.txt_records.join(" ")));
        }
        if self.records.cname {
            line.push_str(&format!(" : CNAME {}", result.canonical_name.as_deref().unwrap_or("")));
        }

        writeln!(self.writer, "{}", line).map_err(|e| DnsSearchError::OutputError(e.to_string()))
    }

    fn write_json(&mut self, result: &ProbeResult) -> Result<()> {
        let json = serde_json::to_string(result)
            .map_err(|e| DnsSearchError::OutputError(format!("Failed to serialize JSON: {}", e)))?;

        writeln!(self.writer, "{}", json).map_err(|e| DnsSearchError::OutputError(e.to_string()))
    }

    fn write_csv(&mut self, result: &ProbeResult) -> Result<()> {
        if !self.header_written {
            writeln!(self.writer, "hostname,addresses,txt,cname")
                .map_err(|e| DnsSearchError::OutputError(e.to_string()))?;
            self.header_written = true;
        }

        writeln!(
            self.writer,
            "{},{},{},{}",
            result.hostname,
            csv_field(&result.addresses.join(";")),
            csv_field(&result.txt_records.join(";")),
            result.canonical_name.as_deref().unwrap_or("")
        )
        .map_err(|e| DnsSearchError::OutputError(e.to_string()))
    }
}

impl ResultSink for OutputManager {
    fn on_result(&mut self, result: &ProbeResult) -> Result<()> {
        if result.hostname.is_empty() || !result.has_evidence() {
            return Err(DnsSearchError::OutputError(format!(
                "Refusing to print malformed result: {:?}",
                result
            )));
        }

        match self.config.format {
            OutputFormat::Text => self.write_text(result)?,
            OutputFormat::Json => self.write_json(result)?,
            OutputFormat::Csv => self.write_csv(result)?,
        }

        // Keep the console live; files are flushed on finish.
        if self.config.file.is_none() {
            self.writer.flush().map_err(|e| DnsSearchError::OutputError(e.to_string()))?;
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.writer.flush().map_err(|e| DnsSearchError::OutputError(e.to_string()))
    }
}

fn csv_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

pub fn write_stats<W: Write>(writer: &mut W, stats: &RunStats) -> std::io::Result<()> {
    writeln!(writer)?;
    writeln!(writer, "Requests : {}", stats.executions)?;
    writeln!(writer, "Results  : {}", stats.positive_results)?;
    writeln!(writer, "Time     : {:.3} s", stats.elapsed.as_secs_f64())?;
    writeln!(writer, "Req/s    : {:.2}", stats.throughput)?;
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportTarget {
    Stdout,
    Stderr,
}

/// Where the final stats report goes, if anywhere.
///
/// Stats go to stderr whenever stdout carries machine-readable results.
/// Silent runs skip the report unless they were interrupted.
pub fn report_target(config: &OutputConfig, silent: bool, interrupted: bool) -> Option<ReportTarget> {
    if silent {
        return interrupted.then_some(ReportTarget::Stderr);
    }
    if config.file.is_none() && config.format != OutputFormat::Text {
        Some(ReportTarget::Stderr)
    } else {
        Some(ReportTarget::Stdout)
    }
}

pub fn print_stats(stats: &RunStats, config: &OutputConfig, silent: bool, interrupted: bool) {
    let result = match report_target(config, silent, interrupted) {
        Some(ReportTarget::Stdout) => write_stats(&mut std::io::stdout().lock(), stats),
        Some(ReportTarget::Stderr) => write_stats(&mut std::io::stderr().lock(), stats),
        None => Ok(()),
    };

    if let Err(e) = result {
        log::error!("Failed to print statistics: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().write(buf)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl SharedBuf {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    fn sample() -> ProbeResult {
        ProbeResult {
            hostname: "www.example.com".to_string(),
            addresses: vec!["93.184.216.34".to_string(), "2606:2800:220:1::".to_string()],
            txt_records: vec!["v=spf1 include:_spf.example.com ~all".to_string()],
            canonical_name: Some("edge.example.net".to_string()),
        }
    }

    fn manager(format: OutputFormat, records: RecordTypes) -> (OutputManager, SharedBuf) {
        let buf = SharedBuf::default();
        let config = OutputConfig {
            format,
            color: false,
            ..OutputConfig::default()
        };
        (OutputManager::with_writer(config, records, Box::new(buf.clone())), buf)
    }

    #[test]
    fn test_text_output_shows_requested_records() {
        let records = RecordTypes {
            a: true,
            txt: false,
            cname: true,
        };
        let (mut out, buf) = manager(OutputFormat::Text, records);
        out.on_result(&sample()).unwrap();

        assert_eq!(
            buf.contents(),
            "          www.example.com : A [93.184.216.34 2606:2800:220:1::] : CNAME edge.example.net\n"
        );
    }

    #[test]
    fn test_json_lines() {
        let (mut out, buf) = manager(OutputFormat::Json, RecordTypes::default());
        out.on_result(&sample()).unwrap();
        out.finish().unwrap();

        let parsed: ProbeResult = serde_json::from_str(buf.contents().trim()).unwrap();
        assert_eq!(parsed, sample());
    }

    #[test]
    fn test_csv_header_once() {
        let (mut out, buf) = manager(OutputFormat::Csv, RecordTypes::default());
        out.on_result(&sample()).unwrap();
        out.on_result(&sample()).unwrap();

        let contents = buf.contents();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "hostname,addresses,txt,cname");
        assert!(lines[1].starts_with("www.example.com,93.184.216.34;2606:2800:220:1::,"));
        assert!(lines[1].ends_with(",edge.example.net"));
    }

    #[test]
    fn test_malformed_result_rejected() {
        let (mut out, buf) = manager(OutputFormat::Text, RecordTypes::default());
        let empty = ProbeResult {
            hostname: String::new(),
            addresses: vec!["192.0.2.1".to_string()],
            txt_records: Vec::new(),
            canonical_name: None,
        };
        assert!(matches!(out.on_result(&empty), Err(DnsSearchError::OutputError(_))));
        assert!(buf.contents().is_empty());
    }

    #[test]
    fn test_stats_report() {
        let stats = RunStats {
            executions: 3,
            positive_results: 1,
            elapsed: Duration::from_millis(1500),
            throughput: 2.0,
        };
        let mut buf = Vec::new();
        write_stats(&mut buf, &stats).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("Requests : 3\n"));
        assert!(text.contains("Results  : 1\n"));
        assert!(text.contains("Time     : 1.500 s\n"));
        assert!(text.contains("Req/s    : 2.00\n"));
    }

    #[test]
    fn test_report_target() {
        let text = OutputConfig::default();
        let json = OutputConfig {
            format: OutputFormat::Json,
            ..OutputConfig::default()
        };

        assert_eq!(report_target(&text, false, false), Some(ReportTarget::Stdout));
        assert_eq!(report_target(&json, false, false), Some(ReportTarget::Stderr));
        assert_eq!(report_target(&text, true, false), None);
        assert_eq!(report_target(&text, true, true), Some(ReportTarget::Stderr));
        assert_eq!(report_target(&json, true, true), Some(ReportTarget::Stderr));
    }

    #[test]
    fn test_file_output() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("results.txt");
        let config = OutputConfig {
            file: Some(path.to_string_lossy().into_owned()),
            ..OutputConfig::default()
        };
        let mut out = OutputManager::new(config, RecordTypes::default()).unwrap();
        out.on_result(&sample()).unwrap();
        out.finish().unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("www.example.com : A [93.184.216.34"));
        // No ANSI escapes in files.
        assert!(!written.contains('\u{1b}'));
    }
}
