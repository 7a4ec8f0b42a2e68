//! Benchmark report generation
//!
//! Renders a [`BenchmarkResult`] as text, JSON, Markdown or CSV.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::runner::BenchmarkResult;

/// Report output format
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportFormat {
    /// Plain text table
    Text,
    /// JSON format
    Json,
    /// Pretty-printed JSON
    JsonPretty,
    /// Markdown format
    Markdown,
    /// CSV format
    Csv,
}

impl ReportFormat {
    /// Parse from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" | "table" => Some(Self::Text),
            "json" => Some(Self::Json),
            "json-pretty" => Some(Self::JsonPretty),
            "markdown" | "md" => Some(Self::Markdown),
            "csv" => Some(Self::Csv),
            _ => None,
        }
    }
}

/// Benchmark report generator
pub struct BenchmarkReport;

impl BenchmarkReport {
    /// Render a result in the given format
    pub fn render(result: &BenchmarkResult, format: ReportFormat) -> Result<String> {
        match format {
            ReportFormat::Text => Ok(Self::text(result)),
            ReportFormat::Json => {
                serde_json::to_string(result).context("Failed to serialize result")
            }
            ReportFormat::JsonPretty => {
                serde_json::to_string_pretty(result).context("Failed to serialize result")
            }
            ReportFormat::Markdown => Ok(Self::markdown(result)),
            ReportFormat::Csv => Self::csv(result),
        }
    }

    fn text(result: &BenchmarkResult) -> String {
        let mut output = String::new();
        let l = &result.latency;

        output.push_str(&format!("\n{:=^70}\n", format!(" {} Benchmark ", result.method)));
        output.push_str("\nConfiguration:\n");
        output.push_str(&format!("  Endpoint:      {}\n", result.endpoint_url));
        output.push_str(&format!("  Method:        {}\n", result.method));
        output.push_str(&format!("  Target RPS:    {}\n", result.rps));
        output.push_str(&format!("  Duration:      {} seconds\n", result.duration_seconds));

        output.push_str("\nRequests:\n");
        output.push_str(&format!("  Total:             {:>10}\n", result.total_requests));
        output.push_str(&format!("  Successful:        {:>10}\n", result.success_count));
        output.push_str(&format!("  Errors:            {:>10}\n", result.error_count));
        output.push_str(&format!("  Error Rate:        {:>9.1}%\n", result.error_rate));
        if result.cancelled {
            output.push_str(&format!(
                "  Cancelled after {} of {} requests\n",
                result.total_requests, result.nominal_requests
            ));
        }

        output.push_str(&format!("\nLatency (ms, {} successful samples):\n", l.samples));
        if l.samples == 0 {
            output.push_str("  no successful requests\n");
        } else {
            output.push_str(&format!("  Min:      {:>10.2}\n", l.min));
            output.push_str(&format!("  Avg:      {:>10.2}\n", l.avg));
            output.push_str(&format!("  P50:      {:>10.2}\n", l.percentiles.p50));
            output.push_str(&format!("  P90:      {:>10.2}\n", l.percentiles.p90));
            output.push_str(&format!("  P95:      {:>10.2}\n", l.percentiles.p95));
            output.push_str(&format!("  P99:      {:>10.2}\n", l.percentiles.p99));
            output.push_str(&format!("  Max:      {:>10.2}\n", l.max));
        }

        if result.errors.total() > 0 {
            output.push_str("\nErrors:\n");
            output.push_str(&format!("  Timeout:      {:>10}\n", result.errors.timeout));
            output.push_str(&format!("  HTTP/RPC:     {:>10}\n", result.errors.http_error));
            output.push_str(&format!("  Network:      {:>10}\n", result.errors.network_error));
            for (code, count) in &result.errors.status_codes {
                output.push_str(&format!("  Status {code}:   {count:>10}\n"));
            }
        }

        if let Some(outcomes) = &result.outcomes {
            output.push_str("\nRequests:\n");
            output.push_str("  #      Batch  Latency(ms)  Status  Result\n");
            for o in outcomes {
                output.push_str(&format!(
                    "  {:<6} {:<6} {:>11.2}  {:>6}  {}\n",
                    o.index,
                    o.batch,
                    o.latency_ms,
                    o.http_status.map(|s| s.to_string()).unwrap_or_else(|| "-".to_string()),
                    if o.success {
                        "ok".to_string()
                    } else {
                        format!("{:?}", o.error_kind)
                    }
                ));
            }
        }

        output.push_str(&format!("\n{:=^70}\n", ""));
        output
    }

    fn markdown(result: &BenchmarkResult) -> String {
        let mut output = String::new();
        let l = &result.latency;

        output.push_str(&format!("# {} Benchmark Report\n\n", result.method));
        output.push_str("## Configuration\n\n");
        output.push_str("| Setting | Value |\n");
        output.push_str("|---------|-------|\n");
        output.push_str(&format!("| Endpoint | `{}` |\n", result.endpoint_url));
        output.push_str(&format!("| Target RPS | {} |\n", result.rps));
        output.push_str(&format!("| Duration | {} seconds |\n", result.duration_seconds));

        output.push_str("\n## Requests\n\n");
        output.push_str("| Metric | Value |\n");
        output.push_str("|--------|-------|\n");
        output.push_str(&format!("| Total | {} |\n", result.total_requests));
        output.push_str(&format!("| Successful | {} |\n", result.success_count));
        output.push_str(&format!("| Errors | {} |\n", result.error_count));
        output.push_str(&format!("| Error Rate | {:.1}% |\n", result.error_rate));
        output.push_str(&format!("| Cancelled | {} |\n", result.cancelled));

        output.push_str("\n## Latency (milliseconds)\n\n");
        output.push_str("| Statistic | Value |\n");
        output.push_str("|-----------|-------|\n");
        output.push_str(&format!("| Min | {:.2} |\n", l.min));
        output.push_str(&format!("| Avg | {:.2} |\n", l.avg));
        output.push_str(&format!("| P50 (median) | {:.2} |\n", l.percentiles.p50));
        output.push_str(&format!("| P90 | {:.2} |\n", l.percentiles.p90));
        output.push_str(&format!("| P95 | {:.2} |\n", l.percentiles.p95));
        output.push_str(&format!("| P99 | {:.2} |\n", l.percentiles.p99));
        output.push_str(&format!("| Max | {:.2} |\n", l.max));

        output
    }

    fn csv(result: &BenchmarkResult) -> Result<String> {
        let l = &result.latency;
        let mut writer = csv::Writer::from_writer(Vec::new());

        writer.write_record([
            "endpoint",
            "method",
            "rps",
            "duration_secs",
            "total_requests",
            "successful",
            "errors",
            "error_rate",
            "cancelled",
            "latency_min",
            "latency_max",
            "latency_avg",
            "latency_p50",
            "latency_p90",
            "latency_p95",
            "latency_p99",
        ])?;
        writer.write_record([
            result.endpoint_url.clone(),
            result.method.to_string(),
            result.rps.to_string(),
            result.duration_seconds.to_string(),
            result.total_requests.to_string(),
            result.success_count.to_string(),
            result.error_count.to_string(),
            format!("{:.2}", result.error_rate),
            result.cancelled.to_string(),
            format!("{:.2}", l.min),
            format!("{:.2}", l.max),
            format!("{:.2}", l.avg),
            format!("{:.2}", l.percentiles.p50),
            format!("{:.2}", l.percentiles.p90),
            format!("{:.2}", l.percentiles.p95),
            format!("{:.2}", l.percentiles.p99),
        ])?;

        let bytes = writer
            .into_inner()
            .map_err(|e| anyhow::anyhow!("Failed to flush CSV: {}", e.error()))?;
        String::from_utf8(bytes).context("CSV output was not UTF-8")
    }
}
