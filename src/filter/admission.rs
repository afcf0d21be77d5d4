//! Channel and programme admission
//!
//! Channels are checked by their `id`, programmes by their `channel`
//! reference. The two checks are independent: a programme is admitted on its
//! own merits even when the channel it points at was filtered out.

use std::collections::HashSet;

use crate::diagnostics::{Diagnostics, Warning};
use crate::filter::exclusion::ExclusionSet;
use crate::filter::window::{parse_xmltv_timestamp, TimeWindow};
use crate::xmltv::document::Element;

/// The combined admission criteria for one run
#[derive(Debug, Clone, Copy)]
pub struct Admission<'a> {
    inclusion: Option<&'a HashSet<String>>,
    exclusions: &'a ExclusionSet,
    window: Option<TimeWindow>,
}

impl<'a> Admission<'a> {
    pub fn new(
        inclusion: Option<&'a HashSet<String>>,
        exclusions: &'a ExclusionSet,
        window: Option<TimeWindow>,
    ) -> Self {
        Self {
            inclusion,
            exclusions,
            window,
        }
    }

    /// Inclusion and exclusion test shared by channels and programmes
    pub fn admits_identifier(&self, identifier: &str) -> bool {
        let included = self
            .inclusion
            .map_or(true, |allowed| allowed.contains(identifier));
        included && !self.exclusions.is_excluded(identifier)
    }

    /// The channel's id when it is admitted; channels without an id never are
    pub fn admit_channel(&self, channel: &Element) -> Option<String> {
        let id = channel.attr("id")?;
        self.admits_identifier(&id).then(|| id.into_owned())
    }

    /// Whether a programme passes the identifier test and, if a window is active, the time test
    pub fn admit_programme(&self, programme: &Element, diagnostics: &mut Diagnostics) -> bool {
        let Some(channel) = programme.attr("channel") else {
            return false;
        };
        if !self.admits_identifier(&channel) {
            return false;
        }

        let Some(window) = self.window else {
            return true;
        };
        let start = programme.attr("start");
        match start.as_deref().and_then(parse_xmltv_timestamp) {
            Some(instant) => window.contains(instant),
            None => {
                diagnostics.warn(Warning::UnparsableTimestamp {
                    channel: channel.into_owned(),
                    value: start.map(|s| s.into_owned()),
                });
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn programme(channel: &str, start: Option<&str>) -> Element {
        let mut element = Element::new("programme").with_attribute("channel", channel);
        if let Some(start) = start {
            element = element.with_attribute("start", start);
        }
        element.with_child(Element::new("title").with_text("T"))
    }

    fn january() -> TimeWindow {
        TimeWindow::from_dates(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
        )
    }

    fn february() -> TimeWindow {
        TimeWindow::from_dates(
            NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        )
    }

    #[test]
    fn test_no_criteria_admits_everything() {
        let exclusions = ExclusionSet::new();
        let admission = Admission::new(None, &exclusions, None);
        let channel = Element::new("channel").with_attribute("id", "a");
        assert_eq!(admission.admit_channel(&channel), Some("a".to_string()));
        assert!(admission.admit_programme(&programme("a", None), &mut Diagnostics::new()));
    }

    #[test]
    fn test_channel_without_id_is_rejected() {
        let exclusions = ExclusionSet::new();
        let admission = Admission::new(None, &exclusions, None);
        assert_eq!(admission.admit_channel(&Element::new("channel")), None);
        assert!(!admission.admit_programme(&Element::new("programme"), &mut Diagnostics::new()));
    }

    #[test]
    fn test_inclusion_and_exclusion_combine() {
        let inclusion: HashSet<String> = ["keep.uk", "news5.uk"].iter().map(|s| s.to_string()).collect();
        let exclusions = ExclusionSet::compile(&["5"], &mut Diagnostics::new());
        let admission = Admission::new(Some(&inclusion), &exclusions, None);

        assert!(admission.admits_identifier("keep.uk"));
        assert!(!admission.admits_identifier("news5.uk"));
        assert!(!admission.admits_identifier("other.uk"));
    }

    #[test]
    fn test_programme_inside_window() {
        let exclusions = ExclusionSet::new();
        let item = programme("a", Some("20240101120000 +0000"));

        let admission = Admission::new(None, &exclusions, Some(january()));
        assert!(admission.admit_programme(&item, &mut Diagnostics::new()));

        let admission = Admission::new(None, &exclusions, Some(february()));
        assert!(!admission.admit_programme(&item, &mut Diagnostics::new()));
    }

    #[test]
    fn test_unparsable_start_only_matters_with_window() {
        let exclusions = ExclusionSet::new();
        let broken = programme("a", Some("not a time"));
        let missing = programme("a", None);

        let open = Admission::new(None, &exclusions, None);
        let mut diagnostics = Diagnostics::new();
        assert!(open.admit_programme(&broken, &mut diagnostics));
        assert!(open.admit_programme(&missing, &mut diagnostics));
        assert!(diagnostics.is_empty());

        let windowed = Admission::new(None, &exclusions, Some(january()));
        assert!(!windowed.admit_programme(&broken, &mut diagnostics));
        assert!(!windowed.admit_programme(&missing, &mut diagnostics));
        assert_eq!(diagnostics.warnings().len(), 2);
    }

    #[test]
    fn test_identifier_rejection_skips_timestamp_check() {
        let inclusion: HashSet<String> = HashSet::from(["b".to_string()]);
        let exclusions = ExclusionSet::new();
        let admission = Admission::new(Some(&inclusion), &exclusions, Some(january()));
        let mut diagnostics = Diagnostics::new();
        assert!(!admission.admit_programme(&programme("a", Some("junk")), &mut diagnostics));
        assert!(diagnostics.is_empty());
    }
}
