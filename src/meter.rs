//! Interval readings from a Green Button (ESPI) export.

use std::path::Path;

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use roxmltree::{Document, Node};

use crate::{error::ParseError, ops::RangeInclusive, prelude::*, quantity::energy::KilowattHours};

const ATOM_NAMESPACE: &str = "http://www.w3.org/2005/Atom";
const ESPI_NAMESPACE: &str = "http://naesb.org/espi";

/// Inclusive range of local dates to keep.
pub type Period = RangeInclusive<NaiveDate>;

impl Default for Period {
    fn default() -> Self {
        Self::new(NaiveDate::MIN, NaiveDate::MAX)
    }
}

/// Energy consumed over a single metering interval.
#[must_use]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Reading {
    /// Local start time of the interval.
    pub timestamp: NaiveDateTime,

    pub value: KilowattHours,
}

#[instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn load(path: impl AsRef<Path>, period: Period) -> Result<Vec<Reading>, ParseError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)
        .map_err(|source| ParseError::Io { path: path.to_path_buf(), source })?;
    let readings = parse(&text, period)?;
    info!(n_readings = readings.len(), ?period, "loaded");
    Ok(readings)
}

/// Parse the readings in document order, keeping those whose local date is within the period.
pub fn parse(text: &str, period: Period) -> Result<Vec<Reading>, ParseError> {
    let document = Document::parse(text)?;
    let mut readings = Vec::new();
    for (index, node) in interval_readings(&document).enumerate() {
        let reading = parse_reading(index, node)?;
        if period.contains(reading.timestamp.date()) {
            readings.push(reading);
        } else {
            trace!(index, ?reading.timestamp, "skipping out-of-period reading");
        }
    }
    Ok(readings)
}

/// `content/IntervalBlock/IntervalReading` under the feed root.
fn interval_readings<'a, 'input>(
    document: &'a Document<'input>,
) -> impl Iterator<Item = Node<'a, 'input>> {
    document
        .root_element()
        .children()
        .filter(|node| node.has_tag_name((ATOM_NAMESPACE, "content")))
        .flat_map(|content| espi_children(content, "IntervalBlock"))
        .flat_map(|block| espi_children(block, "IntervalReading"))
}

fn espi_children<'a, 'input>(
    node: Node<'a, 'input>,
    name: &'static str,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children().filter(move |child| child.has_tag_name((ESPI_NAMESPACE, name)))
}

/// Text of the descendant at the slash-separated `path`.
fn espi_text<'a>(
    index: usize,
    mut node: Node<'a, '_>,
    path: &'static str,
) -> Result<&'a str, ParseError> {
    for name in path.split('/') {
        node = espi_children(node, name)
            .next()
            .ok_or(ParseError::MissingElement { index, element: path })?;
    }
    Ok(node.text().unwrap_or_default().trim())
}

fn parse_reading(index: usize, node: Node<'_, '_>) -> Result<Reading, ParseError> {
    let start = espi_text(index, node, "timePeriod/start")?;
    let timestamp: i64 = start.parse().map_err(|_| ParseError::InvalidNumber {
        index,
        field: "start time",
        text: start.to_owned(),
    })?;
    let timestamp = DateTime::from_timestamp(timestamp, 0)
        .ok_or(ParseError::TimestampOutOfRange { index, timestamp })?
        .with_timezone(&Local)
        .naive_local();

    let value = espi_text(index, node, "value")?;
    let value = value.parse::<f64>().ok().filter(|value| value.is_finite()).ok_or_else(|| {
        ParseError::InvalidNumber { index, field: "value", text: value.to_owned() }
    })?;
    if value < 0.0 {
        return Err(ParseError::NegativeValue { index, value });
    }

    Ok(Reading { timestamp, value: KilowattHours(value) })
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use approx::assert_abs_diff_eq;
    use chrono::{Datelike, Days, TimeDelta, TimeZone};
    use itertools::Itertools;
    use tempfile::NamedTempFile;

    use super::*;

    fn epoch(timestamp: NaiveDateTime) -> i64 {
        Local.from_local_datetime(&timestamp).earliest().unwrap().timestamp()
    }

    fn at(year: i32, month: u32, day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(year, month, day).unwrap().and_hms_opt(hour, 0, 0).unwrap()
    }

    fn feed(readings: &[(i64, &str)]) -> String {
        let readings = readings
            .iter()
            .map(|(start, value)| {
                format!(
                    "<espi:IntervalReading>\
                        <espi:timePeriod>\
                            <espi:duration>3600</espi:duration>\
                            <espi:start>{start}</espi:start>\
                        </espi:timePeriod>\
                        <espi:value>{value}</espi:value>\
                    </espi:IntervalReading>"
                )
            })
            .join("");
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
            <ns3:feed xmlns:ns3="http://www.w3.org/2005/Atom" xmlns:espi="http://naesb.org/espi">
                <ns3:id>urn:uuid:1</ns3:id>
                <ns3:entry>
                    <ns3:content><espi:UsagePoint/></ns3:content>
                </ns3:entry>
                <ns3:content>
                    <espi:IntervalBlock>{readings}</espi:IntervalBlock>
                </ns3:content>
            </ns3:feed>"#
        )
    }

    #[test]
    fn test_parse_ok() {
        let first = at(2021, 7, 15, 12);
        let second = at(2021, 7, 15, 13);
        let text = feed(&[(epoch(first), "1.5"), (epoch(second), "2")]);
        let readings = parse(&text, Period::default()).unwrap();
        assert_eq!(readings.len(), 2);
        assert_eq!(readings[0].timestamp, first);
        assert_abs_diff_eq!(readings[0].value.0, 1.5);
        assert_eq!(readings[1].timestamp, second);
        assert_abs_diff_eq!(readings[1].value.0, 2.0);
    }

    #[test]
    fn test_parse_keeps_document_order() {
        let text = feed(&[(epoch(at(2021, 7, 2, 12)), "1"), (epoch(at(2021, 7, 1, 12)), "2")]);
        let readings = parse(&text, Period::default()).unwrap();
        assert_eq!(readings[0].timestamp, at(2021, 7, 2, 12));
        assert_eq!(readings[1].timestamp, at(2021, 7, 1, 12));
    }

    #[test]
    fn test_parse_multiple_blocks() {
        let text = feed(&[(epoch(at(2021, 7, 1, 12)), "1")]).replace(
            "</espi:IntervalBlock>",
            &format!(
                "</espi:IntervalBlock><espi:IntervalBlock><espi:IntervalReading>\
                    <espi:timePeriod><espi:start>{}</espi:start></espi:timePeriod>\
                    <espi:value>3</espi:value>\
                </espi:IntervalReading></espi:IntervalBlock>",
                epoch(at(2021, 7, 1, 13)),
            ),
        );
        let readings = parse(&text, Period::default()).unwrap();
        assert_eq!(readings.len(), 2);
        assert_abs_diff_eq!(readings[1].value.0, 3.0);
    }

    #[test]
    fn test_parse_empty_feed() {
        let readings = parse(&feed(&[]), Period::default()).unwrap();
        assert!(readings.is_empty());
    }

    #[test]
    fn test_parse_ignores_foreign_namespace() {
        let text = feed(&[(epoch(at(2021, 7, 1, 12)), "1")])
            .replace("http://naesb.org/espi", "http://example.com/other");
        assert!(parse(&text, Period::default()).unwrap().is_empty());
    }

    #[test]
    fn test_parse_malformed_xml() {
        assert!(matches!(parse("<feed>", Period::default()), Err(ParseError::Xml(_))));
    }

    #[test]
    fn test_parse_missing_start() {
        let text = feed(&[(epoch(at(2021, 7, 1, 12)), "1")])
            .replace("<espi:start>", "<espi:end>")
            .replace("</espi:start>", "</espi:end>");
        assert!(matches!(
            parse(&text, Period::default()),
            Err(ParseError::MissingElement { index: 0, .. }),
        ));
    }

    #[test]
    fn test_parse_missing_value() {
        let text = feed(&[(epoch(at(2021, 7, 1, 12)), "1")])
            .replace("<espi:value>1</espi:value>", "");
        assert!(matches!(
            parse(&text, Period::default()),
            Err(ParseError::MissingElement { element: "value", .. }),
        ));
    }

    #[test]
    fn test_parse_invalid_value() {
        let start = epoch(at(2021, 7, 1, 12));
        for value in ["abc", "", "NaN", "inf"] {
            assert!(
                matches!(
                    parse(&feed(&[(start, value)]), Period::default()),
                    Err(ParseError::InvalidNumber { field: "value", .. }),
                ),
                "{value:?}",
            );
        }
    }

    #[test]
    fn test_parse_negative_value() {
        let text = feed(&[(epoch(at(2021, 7, 1, 12)), "-0.5")]);
        assert!(matches!(
            parse(&text, Period::default()),
            Err(ParseError::NegativeValue { index: 0, .. }),
        ));
    }

    #[test]
    fn test_parse_invalid_start() {
        let text = feed(&[(0, "1")])
            .replace("<espi:start>0</espi:start>", "<espi:start>1.5e9</espi:start>");
        assert!(matches!(
            parse(&text, Period::default()),
            Err(ParseError::InvalidNumber { field: "start time", .. }),
        ));
    }

    #[test]
    fn test_parse_filters_by_date() {
        let start = at(2021, 1, 1, 12);
        let readings = (0..365)
            .map(|day| (epoch(start + Days::new(day)), "1"))
            .collect_vec();
        let text = feed(&readings);
        let min_date = start.date();

        let all = parse(&text, Period::default()).unwrap();
        assert_eq!(all.len(), 365);

        let filtered = parse(&text, Period::new(min_date, min_date)).unwrap();
        let expected = all
            .iter()
            .filter(|reading| reading.timestamp.date() == min_date)
            .copied()
            .collect_vec();
        assert_eq!(filtered, expected);
        assert_eq!(filtered.len(), 1);

        let march = parse(
            &text,
            Period::new(
                NaiveDate::from_ymd_opt(2021, 3, 1).unwrap(),
                NaiveDate::from_ymd_opt(2021, 3, 31).unwrap(),
            ),
        )
        .unwrap();
        assert_eq!(march.len(), 31);
        assert!(march.iter().all(|reading| reading.timestamp.month() == 3));
    }

    #[test]
    fn test_parse_filters_hourly_day() {
        let start = at(2021, 5, 10, 0);
        let readings = (0..72)
            .map(|hour| (epoch(start + TimeDelta::hours(hour)), "0.25"))
            .collect_vec();
        let day = NaiveDate::from_ymd_opt(2021, 5, 11).unwrap();
        let filtered = parse(&feed(&readings), Period::new(day, day)).unwrap();
        assert!(filtered.iter().all(|reading| reading.timestamp.date() == day));
        assert!(!filtered.is_empty());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(feed(&[(epoch(at(2021, 7, 1, 12)), "1.25")]).as_bytes()).unwrap();
        let readings = load(file.path(), Period::default()).unwrap();
        assert_eq!(readings.len(), 1);
        assert_abs_diff_eq!(readings[0].value.0, 1.25);
    }

    #[test]
    fn test_load_missing_file() {
        assert!(matches!(
            load("/nonexistent/usage.xml", Period::default()),
            Err(ParseError::Io { .. }),
        ));
    }
}
