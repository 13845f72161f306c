// SPDX-License-Identifier: MIT

//! Pure transformation of the Kill Bill catalog into the plan list served
//! to the frontend.
//!
//! A plan is customer-selectable only if it has an `EVERGREEN` phase and is
//! listed in the `DEFAULT` price list; trial-only plans and non-default
//! price-list variants are silently skipped.

use serde::{Deserialize, Serialize};

/// One version of the Kill Bill catalog. The catalog endpoint returns an
/// array of these; only the last (most recent effective date) is used.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogVersion {
    #[serde(default)]
    pub products: Vec<CatalogProduct>,
    #[serde(default)]
    pub price_lists: Vec<PriceList>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogProduct {
    pub name: String,
    /// Included feature identifiers, e.g. `"priority-support"`.
    #[serde(default)]
    pub included: Vec<String>,
    #[serde(default)]
    pub plans: Vec<CatalogPlan>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogPlan {
    pub name: String,
    #[serde(default)]
    pub pretty_name: Option<String>,
    #[serde(default)]
    pub phases: Vec<CatalogPhase>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogPhase {
    #[serde(rename = "type")]
    pub phase_type: String,
    #[serde(default)]
    pub prices: Vec<CatalogPrice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogPrice {
    pub currency: String,
    pub value: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PriceList {
    pub name: String,
    #[serde(default)]
    pub plans: Vec<String>,
}

/// Subscription tier derived from the Kill Bill product name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Free,
    Basic,
    Premium,
    Enterprise,
}

impl Tier {
    /// Unmapped product names default to `basic`.
    fn from_product_name(name: &str) -> Self {
        match name {
            "Free" => Tier::Free,
            "Basic" => Tier::Basic,
            "Premium" => Tier::Premium,
            "Enterprise" => Tier::Enterprise,
            _ => Tier::Basic,
        }
    }
}

/// Optional billing-interval filter for the plan list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interval {
    Month,
    Year,
}

impl Interval {
    /// The interval is encoded in the plan id by naming convention
    /// ("basic-monthly", "premium-annual"), not a structured field.
    // TODO: switch to the plan's billingPeriod once the catalog exposes it
    // through this endpoint, so renamed plans don't break the filter.
    fn matches(&self, plan_id: &str) -> bool {
        match self {
            Interval::Month => plan_id.contains("monthly"),
            Interval::Year => plan_id.contains("annual"),
        }
    }
}

/// A customer-facing plan.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    pub id: String,
    pub name: String,
    pub tier: Tier,
    pub features: Vec<String>,
    pub prices: Vec<PlanPrice>,
    pub selectable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_us: Option<ContactUs>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanPrice {
    pub currency: String,
    pub amount: f64,
}

/// Enterprise sales contact block. Only enterprise-tier plans carry this.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContactUs {
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub body: String,
}

/// Flatten the catalog into the plan list.
///
/// Pure function of its inputs: the same catalog always yields the same
/// list. An empty result (empty catalog, or everything filtered out) is the
/// caller's cue for `NO_PLANS_AVAILABLE`.
pub fn plans_from_catalog(
    versions: &[CatalogVersion],
    interval: Option<Interval>,
    contact: &ContactUs,
) -> Vec<Plan> {
    // Most recent effective catalog version
    let Some(catalog) = versions.last() else {
        return Vec::new();
    };

    let default_plans: Vec<&str> = catalog
        .price_lists
        .iter()
        .filter(|pl| pl.name == "DEFAULT")
        .flat_map(|pl| pl.plans.iter().map(String::as_str))
        .collect();

    let mut plans = Vec::new();

    for product in &catalog.products {
        let tier = Tier::from_product_name(&product.name);
        let features = feature_list(&product.included);

        for plan in &product.plans {
            let Some(evergreen) = plan.phases.iter().find(|p| p.phase_type == "EVERGREEN") else {
                continue;
            };
            if !default_plans.contains(&plan.name.as_str()) {
                continue;
            }
            if let Some(interval) = interval {
                if !interval.matches(&plan.name) {
                    continue;
                }
            }

            let prices = evergreen
                .prices
                .iter()
                .map(|p| PlanPrice {
                    currency: p.currency.clone(),
                    amount: p.value,
                })
                .collect();

            let enterprise = tier == Tier::Enterprise;
            plans.push(Plan {
                id: plan.name.clone(),
                name: plan.pretty_name.clone().unwrap_or_else(|| plan.name.clone()),
                tier,
                features: features.clone(),
                prices,
                selectable: !enterprise,
                contact_us: enterprise.then(|| contact.clone()),
            });
        }
    }

    plans
}

/// Turn `"priority-support"` into `"Priority Support"`.
fn feature_list(included: &[String]) -> Vec<String> {
    included
        .iter()
        .map(|feature| {
            feature
                .replace('-', " ")
                .split_whitespace()
                .map(capitalize)
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect()
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
