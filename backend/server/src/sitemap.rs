//! Sitemap emission.

use funnel_core::routes::{sitemap_entries, RouteCaps};

/// Render `sitemap.xml` for the whole generated site.
pub fn render_sitemap(base_url: &str, caps: &RouteCaps) -> String {
    let base = base_url.trim_end_matches('/');
    let mut xml = String::with_capacity(256 * 1024);
    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    xml.push('\n');
    xml.push_str(r#"<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">"#);
    xml.push('\n');

    for entry in sitemap_entries(caps) {
        xml.push_str(&format!(
            "  <url>\n    <loc>{base}{path}</loc>\n    <changefreq>{changefreq}</changefreq>\n    <priority>{priority:.1}</priority>\n  </url>\n",
            path = entry.path,
            changefreq = entry.changefreq,
            priority = entry.priority,
        ));
    }

    xml.push_str("</urlset>\n");
    xml
}
