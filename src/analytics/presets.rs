//! Report Presets
//!
//! Named parameter sets for common reports. Each preset only supplies
//! defaults; caller overrides always win.

use std::fmt;
use std::str::FromStr;

use crate::core::QueryParams;
use crate::error::ConfigurationError;

/// Segment selecting mobile traffic.
pub const MOBILE_TRAFFIC_SEGMENT: &str = "gaid::-11";

const AUDIENCE_METRICS: &str = "ga:visitors,ga:newVisits,ga:percentNewVisits,ga:visits,ga:bounces,\
ga:pageviews,ga:visitBounceRate,ga:timeOnSite,ga:avgTimeOnSite";

/// Predefined report.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ReportPreset {
    VisitsByDate,
    AudienceStatistics,
    VisitsByCountries,
    VisitsByCities,
    VisitsByLanguages,
    VisitsBySystemBrowsers,
    VisitsBySystemOs,
    VisitsBySystemResolutions,
    VisitsByMobileOs,
    VisitsByMobileResolutions,
    PageviewsByDate,
    ContentStatistics,
    ContentTopPages,
    TrafficSources,
    Keywords,
    ReferralTraffic,
}

impl ReportPreset {
    pub const ALL: [ReportPreset; 16] = [
        Self::VisitsByDate,
        Self::AudienceStatistics,
        Self::VisitsByCountries,
        Self::VisitsByCities,
        Self::VisitsByLanguages,
        Self::VisitsBySystemBrowsers,
        Self::VisitsBySystemOs,
        Self::VisitsBySystemResolutions,
        Self::VisitsByMobileOs,
        Self::VisitsByMobileResolutions,
        Self::PageviewsByDate,
        Self::ContentStatistics,
        Self::ContentTopPages,
        Self::TrafficSources,
        Self::Keywords,
        Self::ReferralTraffic,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::VisitsByDate => "visits-by-date",
            Self::AudienceStatistics => "audience-statistics",
            Self::VisitsByCountries => "visits-by-countries",
            Self::VisitsByCities => "visits-by-cities",
            Self::VisitsByLanguages => "visits-by-languages",
            Self::VisitsBySystemBrowsers => "visits-by-system-browsers",
            Self::VisitsBySystemOs => "visits-by-system-os",
            Self::VisitsBySystemResolutions => "visits-by-system-resolutions",
            Self::VisitsByMobileOs => "visits-by-mobile-os",
            Self::VisitsByMobileResolutions => "visits-by-mobile-resolutions",
            Self::PageviewsByDate => "pageviews-by-date",
            Self::ContentStatistics => "content-statistics",
            Self::ContentTopPages => "content-top-pages",
            Self::TrafficSources => "traffic-sources",
            Self::Keywords => "keywords",
            Self::ReferralTraffic => "referral-traffic",
        }
    }

    /// `(metrics, dimensions, sort, segment)`
    fn table(&self) -> (&'static str, Option<&'static str>, Option<&'static str>, Option<&'static str>) {
        match self {
            Self::VisitsByDate => ("ga:visits", Some("ga:date"), None, None),
            Self::AudienceStatistics => (AUDIENCE_METRICS, None, None, None),
            Self::VisitsByCountries => ("ga:visits", Some("ga:country"), Some("-ga:visits"), None),
            Self::VisitsByCities => ("ga:visits", Some("ga:city"), Some("-ga:visits"), None),
            Self::VisitsByLanguages => ("ga:visits", Some("ga:language"), Some("-ga:visits"), None),
            Self::VisitsBySystemBrowsers => ("ga:visits", Some("ga:browser"), Some("-ga:visits"), None),
            Self::VisitsBySystemOs => {
                ("ga:visits", Some("ga:operatingSystem"), Some("-ga:visits"), None)
            }
            Self::VisitsBySystemResolutions => {
                ("ga:visits", Some("ga:screenResolution"), Some("-ga:visits"), None)
            }
            Self::VisitsByMobileOs => (
                "ga:visits",
                Some("ga:operatingSystem"),
                Some("-ga:visits"),
                Some(MOBILE_TRAFFIC_SEGMENT),
            ),
            Self::VisitsByMobileResolutions => (
                "ga:visits",
                Some("ga:screenResolution"),
                Some("-ga:visits"),
                Some(MOBILE_TRAFFIC_SEGMENT),
            ),
            Self::PageviewsByDate => ("ga:pageviews", Some("ga:date"), None, None),
            Self::ContentStatistics => ("ga:pageviews,ga:uniquePageviews", None, None, None),
            Self::ContentTopPages => {
                ("ga:pageviews", Some("ga:pagePath"), Some("-ga:pageviews"), None)
            }
            Self::TrafficSources => ("ga:visits", Some("ga:medium"), None, None),
            Self::Keywords => ("ga:visits", Some("ga:keyword"), Some("-ga:visits"), None),
            Self::ReferralTraffic => ("ga:visits", Some("ga:source"), Some("-ga:visits"), None),
        }
    }

    /// Default parameters of this preset.
    pub fn params(&self) -> QueryParams {
        let (metrics, dimensions, sort, segment) = self.table();
        let mut params = QueryParams::new().with("metrics", metrics);
        let optional = [("dimensions", dimensions), ("sort", sort), ("segment", segment)];
        for (key, value) in optional {
            if let Some(value) = value {
                params.insert(key, value);
            }
        }
        params
    }

    /// Preset defaults with `overrides` applied on top.
    pub fn with_overrides(&self, overrides: &QueryParams) -> QueryParams {
        let mut params = self.params();
        params.merge(overrides);
        params
    }
}

impl fmt::Display for ReportPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ReportPreset {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|preset| preset.name() == s)
            .ok_or_else(|| ConfigurationError::InvalidConfig {
                message: format!("Unknown report preset: {}", s),
            })
    }
}
