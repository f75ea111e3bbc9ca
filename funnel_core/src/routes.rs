//! Programmatic route generation and sitemap entries.
//!
//! Pages are the cartesian product of the fixed topic and city catalogs:
//! city-only consultation pages, topic-only legal-notice pages, and a
//! capped topic × city subset.  The caps are explicit configuration so the
//! generated page volume stays bounded and auditable.

use serde::{Deserialize, Serialize};

use crate::catalog::{self, CITIES, TOPICS};

/// Bounds on the topic × city combination pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteCaps {
    /// How many topics (in catalog order) get per-city pages.
    pub topic_city_topics: usize,
    /// How many cities (in catalog order) each capped topic gets.
    pub topic_city_cities: usize,
}

impl Default for RouteCaps {
    fn default() -> Self {
        RouteCaps {
            topic_city_topics: 25,
            topic_city_cities: 40,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteKind {
    ConsultationCity,
    LegalNoticeTopic,
    LegalNoticeTopicCity,
}

/// One generated page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteDescriptor {
    pub kind: RouteKind,
    pub path: String,
    pub title: String,
    pub description: String,
    /// Canonical path; identical to `path` for generated pages.
    pub canonical: String,
    pub priority: f32,
    pub changefreq: &'static str,
}

/// A sitemap line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SitemapEntry {
    pub path: String,
    pub priority: f32,
    pub changefreq: &'static str,
}

fn descriptor(
    kind: RouteKind,
    path: String,
    title: String,
    description: String,
    priority: f32,
    changefreq: &'static str,
) -> RouteDescriptor {
    RouteDescriptor {
        kind,
        canonical: path.clone(),
        path,
        title,
        description,
        priority,
        changefreq,
    }
}

/// Generate every page descriptor, in a stable order: consultation pages,
/// then topic pages, then the capped topic × city product.
pub fn generate_routes(caps: &RouteCaps) -> Vec<RouteDescriptor> {
    let mut routes = Vec::new();

    for city in CITIES {
        let city_name = catalog::city_display_name(city);
        routes.push(descriptor(
            RouteKind::ConsultationCity,
            format!("/consultation/{city}"),
            format!("Talk to a Lawyer in {city_name} | Online Consultation"),
            format!(
                "Book a confidential online consultation with an experienced lawyer in {city_name}. Advice on property, family, employment and consumer matters."
            ),
            0.7,
            "weekly",
        ));
    }

    for (topic, title) in TOPICS {
        routes.push(descriptor(
            RouteKind::LegalNoticeTopic,
            format!("/send-a-legal-notice/{topic}"),
            format!("{title} Legal Notice | Drafted & Sent by Lawyers"),
            format!(
                "Send a lawyer-drafted {title} legal notice with registered-post dispatch and delivery proof. Fully online."
            ),
            0.8,
            "weekly",
        ));
    }

    for (topic, title) in TOPICS.iter().take(caps.topic_city_topics) {
        for city in CITIES.iter().take(caps.topic_city_cities) {
            let city_name = catalog::city_display_name(city);
            routes.push(descriptor(
                RouteKind::LegalNoticeTopicCity,
                format!("/send-a-legal-notice/{topic}/{city}"),
                format!("{title} Legal Notice in {city_name}"),
                format!(
                    "Send a lawyer-drafted {title} legal notice in {city_name}. Online process, registered-post dispatch, delivery proof."
                ),
                0.6,
                "weekly",
            ));
        }
    }

    routes
}

/// Hand-listed static paths with priority over-rides, emitted ahead of the
/// generated product.
fn static_entries() -> Vec<SitemapEntry> {
    let fixed: &[(&str, f32, &'static str)] = &[
        ("/", 1.0, "daily"),
        ("/send-a-legal-notice", 0.9, "weekly"),
        ("/consultation", 0.9, "weekly"),
        ("/document-drafting", 0.9, "weekly"),
        ("/corporate-retainer", 0.8, "monthly"),
        ("/for-lawyers", 0.5, "monthly"),
        ("/about", 0.4, "monthly"),
        ("/privacy-policy", 0.3, "yearly"),
        ("/terms", 0.3, "yearly"),
        ("/refund-policy", 0.3, "yearly"),
    ];
    fixed
        .iter()
        .map(|(path, priority, changefreq)| SitemapEntry {
            path: path.to_string(),
            priority: *priority,
            changefreq,
        })
        .collect()
}

/// Full sitemap: static paths first, then every generated route.
pub fn sitemap_entries(caps: &RouteCaps) -> Vec<SitemapEntry> {
    let mut entries = static_entries();
    entries.extend(generate_routes(caps).into_iter().map(|r| SitemapEntry {
        path: r.path,
        priority: r.priority,
        changefreq: r.changefreq,
    }));
    entries
}
