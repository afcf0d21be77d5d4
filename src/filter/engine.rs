//! Selection and transformation engine
//!
//! One call compiles the exclusions, resolves the time window, splits the
//! document's top-level channels and programmes into survivors, and runs the
//! requested reducer passes over them.

use std::collections::HashSet;

use chrono::{NaiveDate, NaiveDateTime};
use tracing::{debug, info};

use crate::config::Config;
use crate::diagnostics::{Diagnostics, Warning};
use crate::filter::admission::Admission;
use crate::filter::exclusion::ExclusionSet;
use crate::filter::reducer::Reducer;
use crate::filter::window::{resolve, TimeWindow, WindowSpec};
use crate::xmltv::document::{Document, Element, Node, CHANNEL_TAG, PROGRAMME_TAG};

/// Everything that varies between runs
#[derive(Debug, Clone)]
pub struct FilterRequest {
    /// Allow-list of channel ids; `None` means no inclusion filtering
    pub inclusion: Option<HashSet<String>>,
    /// Raw range expressions from the command line, config and exclusion files
    pub exclusion_expressions: Vec<String>,
    pub days_future: Option<i64>,
    pub days_past: Option<i64>,
    pub explicit_start: Option<NaiveDate>,
    pub strip_descriptions: bool,
    pub basic_mode: bool,
    pub now: NaiveDateTime,
}

impl FilterRequest {
    /// A request with no criteria: every channel and programme survives
    pub fn new(now: NaiveDateTime) -> Self {
        Self {
            inclusion: None,
            exclusion_expressions: Vec::new(),
            days_future: None,
            days_past: None,
            explicit_start: None,
            strip_descriptions: false,
            basic_mode: false,
            now,
        }
    }

    pub fn window_spec(&self) -> WindowSpec {
        WindowSpec {
            days_future: self.days_future,
            days_past: self.days_past,
            explicit_start: self.explicit_start,
        }
    }
}

/// Survivors of one filter call, in source order
#[derive(Debug, Default)]
pub struct FilterOutcome {
    pub channels: Vec<Element>,
    pub programmes: Vec<Element>,
    pub found_ids: HashSet<String>,
    pub window: Option<TimeWindow>,
    pub descriptions_removed: usize,
    pub basic_children_removed: usize,
}

/// The filter engine, configured once and reusable across documents
#[derive(Debug, Clone)]
pub struct FilterEngine {
    reducer: Reducer,
    default_span_days: i64,
}

impl FilterEngine {
    pub fn new(config: &Config) -> Self {
        Self {
            reducer: Reducer::new(&config.reducer),
            default_span_days: config.window.default_span_days,
        }
    }

    /// Run admission and reduction over `document`
    ///
    /// Admitted top-level channels and programmes are moved out of the
    /// document root into the outcome; everything else at the top level is
    /// dropped.
    pub fn filter(
        &self,
        document: &mut Document,
        request: &FilterRequest,
        diagnostics: &mut Diagnostics,
    ) -> FilterOutcome {
        let exclusions = ExclusionSet::compile(&request.exclusion_expressions, diagnostics);
        if !exclusions.is_empty() {
            info!("Total exclusion patterns: {}", exclusions.len());
        }

        let window = resolve(&request.window_spec(), request.now, self.default_span_days);
        if let Some(window) = window {
            if window.is_clamped() {
                diagnostics.warn(Warning::WindowClamped {
                    start: window.start,
                    end: window.end,
                });
            }
            info!(
                "Date range: {} to {}",
                window.start.format("%Y-%m-%d"),
                window.end.format("%Y-%m-%d")
            );
        }

        let admission = Admission::new(request.inclusion.as_ref(), &exclusions, window);
        let mut outcome = FilterOutcome {
            window,
            ..FilterOutcome::default()
        };

        for node in std::mem::take(&mut document.root.children) {
            let Node::Element(element) = node else {
                continue;
            };
            if element.is(CHANNEL_TAG) {
                if let Some(id) = admission.admit_channel(&element) {
                    outcome.found_ids.insert(id);
                    outcome.channels.push(element);
                }
            } else if element.is(PROGRAMME_TAG) {
                if admission.admit_programme(&element, diagnostics) {
                    outcome.programmes.push(element);
                }
            } else {
                debug!("Dropping top-level <{}>", element.name);
            }
        }

        if request.strip_descriptions {
            info!("Stripping descriptions...");
            for element in outcome.channels.iter_mut().chain(outcome.programmes.iter_mut()) {
                outcome.descriptions_removed +=
                    self.reducer.strip_descriptions(element, diagnostics);
            }
        }

        if request.basic_mode {
            info!("Applying basic mode (keeping only programme attributes and title)...");
            for programme in outcome.programmes.iter_mut() {
                outcome.basic_children_removed += self.reducer.reduce_to_basic(programme);
            }
        }

        info!(
            "Results: {} channels, {} programmes",
            outcome.channels.len(),
            outcome.programmes.len()
        );
        outcome
    }
}

impl Default for FilterEngine {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xmltv::parser::parse_document;

    const GUIDE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<tv>
  <channel id="one.uk"><display-name>One</display-name></channel>
  <channel id="two.uk"><display-name>Two</display-name></channel>
  <programme start="20240101060000 +0000" channel="one.uk">
    <title>Breakfast</title><desc>Morning news</desc><rating><value>U</value></rating>
  </programme>
  <programme start="20240101120000 +0000" channel="two.uk">
    <title>Lunch</title><desc>Midday</desc>
  </programme>
  <programme start="20240215200000 +0000" channel="one.uk">
    <title>Film</title><credits><actor>A<desc>bio</desc></actor></credits>
  </programme>
</tv>"#;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn run(request: &FilterRequest) -> (FilterOutcome, Diagnostics) {
        let mut diagnostics = Diagnostics::new();
        let mut document = parse_document(GUIDE, &mut diagnostics).unwrap();
        let outcome = FilterEngine::default().filter(&mut document, request, &mut diagnostics);
        (outcome, diagnostics)
    }

    fn channels_of(outcome: &FilterOutcome) -> Vec<String> {
        outcome
            .programmes
            .iter()
            .map(|p| p.attr("channel").unwrap().into_owned())
            .collect()
    }

    #[test]
    fn test_no_criteria_keeps_everything() {
        let (outcome, _) = run(&FilterRequest::new(now()));
        assert_eq!(outcome.channels.len(), 2);
        assert_eq!(outcome.programmes.len(), 3);
        assert_eq!(outcome.found_ids.len(), 2);
        assert!(outcome.window.is_none());
    }

    #[test]
    fn test_inclusion_selects_channel_and_its_programmes() {
        let mut request = FilterRequest::new(now());
        request.inclusion = Some(HashSet::from(["one.uk".to_string()]));

        let (outcome, _) = run(&request);
        assert_eq!(outcome.channels.len(), 1);
        assert_eq!(outcome.channels[0].attr("id").unwrap(), "one.uk");
        assert_eq!(channels_of(&outcome), vec!["one.uk", "one.uk"]);
        assert_eq!(outcome.found_ids, HashSet::from(["one.uk".to_string()]));
    }

    #[test]
    fn test_programmes_survive_without_their_channel() {
        let mut request = FilterRequest::new(now());
        request.inclusion = Some(HashSet::from(["two.uk".to_string(), "ghost".to_string()]));

        let mut diagnostics = Diagnostics::new();
        let mut document = parse_document(
            r#"<tv><programme channel="ghost" start="20240101000000"/></tv>"#,
            &mut diagnostics,
        )
        .unwrap();
        let outcome = FilterEngine::default().filter(&mut document, &request, &mut diagnostics);
        assert!(outcome.channels.is_empty());
        assert_eq!(outcome.programmes.len(), 1);
    }

    #[test]
    fn test_exclusion_ranges_apply_to_both() {
        let mut request = FilterRequest::new(now());
        request.exclusion_expressions = vec!["two.uk".to_string()];

        let (outcome, _) = run(&request);
        assert_eq!(outcome.channels.len(), 1);
        assert_eq!(channels_of(&outcome), vec!["one.uk", "one.uk"]);
    }

    #[test]
    fn test_time_window_filters_programmes_only() {
        let mut request = FilterRequest::new(now());
        request.explicit_start = Some(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        request.days_future = Some(2);

        let (outcome, _) = run(&request);
        assert_eq!(outcome.channels.len(), 2);
        assert_eq!(channels_of(&outcome), vec!["one.uk", "two.uk"]);
        assert!(outcome.window.is_some());
    }

    #[test]
    fn test_oversized_day_counts_are_clamped() {
        let mut request = FilterRequest::new(now());
        request.days_past = Some(i64::MAX / 2);
        request.days_future = Some(1);

        let (outcome, diagnostics) = run(&request);
        assert_eq!(channels_of(&outcome), vec!["one.uk", "two.uk"]);
        assert_eq!(outcome.window.unwrap().start, NaiveDateTime::MIN);
        assert!(matches!(
            diagnostics.warnings(),
            [Warning::WindowClamped { .. }]
        ));
    }

    #[test]
    fn test_start_at_calendar_end_admits_nothing() {
        let mut request = FilterRequest::new(now());
        request.explicit_start = Some(NaiveDate::MAX);

        let (outcome, diagnostics) = run(&request);
        assert_eq!(outcome.channels.len(), 2);
        assert!(outcome.programmes.is_empty());
        assert_eq!(diagnostics.warnings().len(), 1);
    }

    #[test]
    fn test_strip_descriptions_and_basic_mode() {
        let mut request = FilterRequest::new(now());
        request.strip_descriptions = true;
        request.basic_mode = true;

        let (outcome, diagnostics) = run(&request);
        assert_eq!(outcome.descriptions_removed, 3);
        for programme in &outcome.programmes {
            let names: Vec<&str> = programme.elements().map(|e| e.name.as_str()).collect();
            assert_eq!(names, vec!["title"]);
            assert!(programme.attr("start").is_some());
        }
        assert_eq!(outcome.channels[0].elements().count(), 1);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_strip_descriptions_alone_keeps_other_children() {
        let mut request = FilterRequest::new(now());
        request.strip_descriptions = true;

        let (outcome, _) = run(&request);
        let film = &outcome.programmes[2];
        assert_eq!(film.count_descendants("desc"), 0);
        assert_eq!(film.count_descendants("actor"), 1);
        assert_eq!(outcome.programmes[0].count_descendants("rating"), 1);
    }

    #[test]
    fn test_malformed_range_does_not_stop_run() {
        let mut request = FilterRequest::new(now());
        request.exclusion_expressions = vec!["1-2-3".to_string()];

        let (outcome, diagnostics) = run(&request);
        assert_eq!(outcome.channels.len(), 2);
        assert_eq!(diagnostics.warnings().len(), 1);
    }
}
