use super::{format_elevation, format_heart_rate, format_pace, ActivityReport};
use crate::error::ExportError;
use std::io::Write;
use std::path::Path;

/// Write a human-readable activity report
pub fn write_report<W: Write>(report: &ActivityReport, mut out: W) -> Result<(), ExportError> {
    let summary = &report.summary;

    writeln!(out, "{:=<48}", "")?;
    writeln!(out, "ACTIVITY REPORT")?;
    writeln!(out, "{:=<48}", "")?;
    writeln!(out)?;

    writeln!(out, "SUMMARY")?;
    writeln!(out, "{:-<48}", "")?;
    if let Some(start) = summary.start_time {
        writeln!(out, "Started: {}", start.format("%Y-%m-%d %H:%M:%S UTC"))?;
    }
    if let Some(distance) = summary.total_distance {
        writeln!(
            out,
            "Distance: {:.2} {}",
            distance / report.unit_meters,
            report.unit
        )?;
    }
    if let Some(elapsed) = summary.elapsed_seconds {
        writeln!(out, "Elapsed Time: {}", format_duration(elapsed))?;
    }
    if let Some(moving) = summary.moving_seconds {
        writeln!(out, "Moving Time: {}", format_duration(moving))?;
    }
    writeln!(
        out,
        "Paused: {} across {} pause(s)",
        format_duration(summary.paused_seconds),
        summary.pause_count
    )?;
    writeln!(out, "Average HR: {}", format_heart_rate(summary.avg_heart_rate))?;
    writeln!(out, "Records: {}", summary.record_count)?;
    writeln!(out)?;

    writeln!(out, "SPLITS")?;
    writeln!(out, "{:-<48}", "")?;
    if report.splits.is_empty() {
        writeln!(out, "No complete splits")?;
    } else {
        writeln!(
            out,
            "{:<8} {:<8} {:<10} {:<8}",
            report.unit, "Pace", "Avg HR", "Elev"
        )?;
        for split in &report.splits {
            writeln!(
                out,
                "{:<8} {:<8} {:<10} {:<8}",
                split.distance_label(),
                format_pace(split.pace_seconds_per_unit),
                format_heart_rate(split.avg_heart_rate),
                format_elevation(split.elevation_change)
            )?;
        }
    }

    if !report.paused_intervals.is_empty() {
        writeln!(out)?;
        writeln!(out, "PAUSES")?;
        writeln!(out, "{:-<48}", "")?;
        for pause in &report.paused_intervals {
            writeln!(out, "{} ({})", pause, format_duration(pause.duration()))?;
        }
    }

    Ok(())
}

/// Export the report to a text file
pub fn export_report<P: AsRef<Path>>(
    report: &ActivityReport,
    output_path: P,
) -> Result<(), ExportError> {
    let file = std::fs::File::create(output_path)?;
    let mut writer = std::io::BufWriter::new(file);
    write_report(report, &mut writer)?;
    writer.flush()?;
    Ok(())
}

/// `h:mm:ss` or `m:ss`
pub fn format_duration(seconds: i64) -> String {
    let sign = if seconds < 0 { "-" } else { "" };
    let seconds = seconds.abs();
    let (hours, minutes, secs) = (seconds / 3600, (seconds % 3600) / 60, seconds % 60);
    if hours > 0 {
        format!("{}{}:{:02}:{:02}", sign, hours, minutes, secs)
    } else {
        format!("{}{}:{:02}", sign, minutes, secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity::Activity;
    use crate::config::{AnalysisConfig, DistanceUnit};
    use crate::models::{ActivityData, Event, EventType, Record};

    fn sample_report() -> ActivityReport {
        report_in(DistanceUnit::Kilometer)
    }

    fn report_in(unit: DistanceUnit) -> ActivityReport {
        let records = (0..=120)
            .map(|i| Record {
                timestamp: Some(i * 5),
                distance: Some(i as f64 * 10.0),
                altitude: Some(20.0),
                heart_rate: Some(150),
                ..Default::default()
            })
            .collect();
        let events = vec![
            Event::timer(0, EventType::Start),
            Event::timer(300, EventType::Stop),
            Event::timer(330, EventType::Start),
        ];
        let config = AnalysisConfig {
            unit,
            ..Default::default()
        };
        let activity = Activity::with_config(ActivityData::new(records, events), config);
        ActivityReport::from_activity(&activity)
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(59), "0:59");
        assert_eq!(format_duration(754), "12:34");
        assert_eq!(format_duration(3_725), "1:02:05");
        assert_eq!(format_duration(-30), "-0:30");
    }

    #[test]
    fn test_report_sections() {
        let mut buffer = Vec::new();
        write_report(&sample_report(), &mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();

        assert!(text.contains("ACTIVITY REPORT"));
        assert!(text.contains("Started: 1970-01-01 00:00:00 UTC"));
        assert!(text.contains("Distance: 1.20 km"));
        assert!(text.contains(&format!("{:<8} Pace", "km")));
        assert!(text.contains("150 bpm"));
        assert!(text.contains("[300, 330) (0:30)"));
    }

    #[test]
    fn test_report_distance_uses_configured_unit() {
        let mut buffer = Vec::new();
        write_report(&report_in(DistanceUnit::Mile), &mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();

        // 1200 m
        assert!(text.contains("Distance: 0.75 mi"));
        assert!(!text.contains(" km"));
    }

    #[test]
    fn test_export_report_file() {
        let temp_file = tempfile::NamedTempFile::new().unwrap();
        export_report(&sample_report(), temp_file.path()).unwrap();
        let text = std::fs::read_to_string(temp_file.path()).unwrap();
        assert!(text.contains("SPLITS"));
    }
}
