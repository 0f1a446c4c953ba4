use crate::models::{ResourceAnalytics, ResourceClick};
use std::collections::BTreeMap;

const RECENT_COUNT: usize = 10;

pub fn build_analytics(clicks: &[ResourceClick]) -> ResourceAnalytics {
    let mut clicks_by_category = BTreeMap::new();
    let mut clicks_by_resource = BTreeMap::new();

    for click in clicks {
        *clicks_by_category.entry(click.category.clone()).or_insert(0u64) += 1;
        *clicks_by_resource.entry(click.resource.clone()).or_insert(0u64) += 1;
    }

    let recent_start = clicks.len().saturating_sub(RECENT_COUNT);

    ResourceAnalytics {
        total_clicks: clicks.len(),
        clicks_by_category,
        clicks_by_resource,
        recent_clicks: clicks[recent_start..].to_vec(),
    }
}
