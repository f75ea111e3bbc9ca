//! Server-rendered marketing pages.
//!
//! Plain format-string rendering: the copy comes from
//! [`funnel_core::content`], the route metadata from
//! [`funnel_core::routes`].  User-derived strings (slugs from the URL) are
//! validated against the catalogs before they get here and escaped anyway.

use v_htmlescape::escape;

use funnel_core::content::{Faq, TopicContent};
use funnel_core::{catalog, content, pricing, ServiceType};

/// Shared page chrome.  `autopen_service` comes from the `?type=` deep
/// link and makes the client script open the lead form pre-populated.
fn layout(
    title: &str,
    description: &str,
    canonical: &str,
    autopen_service: Option<ServiceType>,
    body: &str,
) -> String {
    let autopen_attr = autopen_service
        .map(|s| format!(" data-autopen-service=\"{}\"", s.as_str()))
        .unwrap_or_default();
    // `v_htmlescape` entity-encodes `/`, which would mangle the canonical
    // path; attribute-escape it by hand instead.
    let canonical = escape_attr(canonical);
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>{title}</title>
    <meta name="description" content="{description}">
    <link rel="canonical" href="{canonical}">
    <link rel="stylesheet" href="/assets/site.css">
    <script src="/assets/funnel.js" defer></script>
</head>
<body{autopen_attr}>
{body}
</body>
</html>"#,
        title = escape(title),
        description = escape(description),
    )
}

/// Minimal attribute escaping that leaves `/` intact.
fn escape_attr(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn render_list(items: &[String]) -> String {
    items
        .iter()
        .map(|item| format!("        <li>{}</li>\n", escape(item)))
        .collect()
}

fn render_content_sections(content: &TopicContent) -> String {
    let process: String = content
        .process
        .iter()
        .enumerate()
        .map(|(i, step)| {
            format!(
                "        <li><strong>{}. {}</strong> — {}</li>\n",
                i + 1,
                escape(&step.title),
                escape(&step.detail)
            )
        })
        .collect();

    let timeline: String = content
        .timeline
        .iter()
        .map(|row| {
            format!(
                "        <tr><td>{}</td><td>{}</td></tr>\n",
                escape(&row.stage),
                escape(&row.duration)
            )
        })
        .collect();

    format!(
        r#"    <section class="benefits">
      <h2>Why send it through us</h2>
      <ul>
{benefits}      </ul>
    </section>
    <section class="who">
      <h2>Who needs this</h2>
      <ul>
{who}      </ul>
    </section>
    <section class="documents">
      <h2>Documents needed</h2>
      <ul>
{documents}      </ul>
    </section>
    <section class="deliverables">
      <h2>What you get</h2>
      <ul>
{deliverables}      </ul>
    </section>
    <section class="process">
      <h2>How it works</h2>
      <ol>
{process}      </ol>
    </section>
    <section class="timeline">
      <h2>Timeline</h2>
      <table>
        <tr><th>Stage</th><th>Duration</th></tr>
{timeline}      </table>
    </section>
"#,
        benefits = render_list(&content.benefits),
        who = render_list(&content.who_needs_this),
        documents = render_list(&content.documents_needed),
        deliverables = render_list(&content.deliverables),
    )
}

fn render_faqs(faqs: &[Faq]) -> String {
    let items: String = faqs
        .iter()
        .map(|f| {
            format!(
                "      <div class=\"faq-item\">\n        <h3>{}</h3>\n        <p>{}</p>\n      </div>\n",
                escape(&f.question),
                escape(&f.answer)
            )
        })
        .collect();
    format!(
        "    <section class=\"faqs\">\n      <h2>Frequently Asked Questions</h2>\n{items}    </section>\n"
    )
}

fn render_cta(service: ServiceType) -> String {
    let money = pricing::advance_amount(service);
    format!(
        r#"    <section class="cta">
      <button class="open-funnel" data-service="{service}">Get Started — {price} advance</button>
    </section>
"#,
        service = service.as_str(),
        price = money.display(),
    )
}

/// `/send-a-legal-notice/{topic}` and `/send-a-legal-notice/{topic}/{city}`.
pub fn render_topic_page(
    topic: &str,
    city: Option<&str>,
    autopen_service: Option<ServiceType>,
) -> String {
    let resolved = content::resolve_content(topic, city);
    let faqs = content::resolve_faqs(topic, city);

    let canonical = match city {
        Some(c) => format!("/send-a-legal-notice/{topic}/{c}"),
        None => format!("/send-a-legal-notice/{topic}"),
    };

    let body = format!(
        r#"  <main>
    <header class="hero">
      <h1>{title}</h1>
      <p class="subtitle">{subtitle}</p>
    </header>
{sections}{cta}{faqs}  </main>"#,
        title = escape(&resolved.hero_title),
        subtitle = escape(&resolved.hero_subtitle),
        sections = render_content_sections(&resolved),
        cta = render_cta(ServiceType::LegalNotice),
        faqs = render_faqs(&faqs),
    );

    layout(
        &resolved.hero_title,
        &resolved.hero_subtitle,
        &canonical,
        autopen_service,
        &body,
    )
}

/// `/consultation/{city}`.
pub fn render_consultation_page(city: &str, autopen_service: Option<ServiceType>) -> String {
    let city_name = catalog::city_display_name(city);
    let title = format!("Talk to a Lawyer in {city_name}");
    let subtitle = format!(
        "Book a confidential online consultation with an experienced lawyer in {city_name}. Property, family, employment, consumer and business matters."
    );
    let faqs = content::resolve_faqs("consultation", Some(city));

    let body = format!(
        r#"  <main>
    <header class="hero">
      <h1>{title}</h1>
      <p class="subtitle">{subtitle}</p>
    </header>
{cta}{faqs}  </main>"#,
        title = escape(&title),
        subtitle = escape(&subtitle),
        cta = render_cta(ServiceType::Consultation),
        faqs = render_faqs(&faqs),
    );

    layout(
        &title,
        &subtitle,
        &format!("/consultation/{city}"),
        autopen_service,
        &body,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn topic_page_carries_metadata_and_copy() {
        let html = render_topic_page("cheque-bounce", None, None);
        assert!(html.contains("<title>"));
        assert!(html.contains("Section 138"));
        assert!(html.contains("canonical\" href=\"/send-a-legal-notice/cheque-bounce\""));
        assert!(html.contains("Frequently Asked Questions"));
    }

    #[test]
    fn city_page_mentions_the_city() {
        let html = render_topic_page("cheque-bounce", Some("navi-mumbai"), None);
        assert!(html.contains("Navi Mumbai"));
        assert!(html.contains("/send-a-legal-notice/cheque-bounce/navi-mumbai"));
    }

    #[test]
    fn canonical_href_keeps_slashes_unescaped() {
        let html = render_topic_page("cheque-bounce", Some("mumbai"), None);
        assert!(html.contains("href=\"/send-a-legal-notice/cheque-bounce/mumbai\""));
        assert!(!html.contains("&#x2f;"));
    }

    #[test]
    fn deep_link_sets_the_autopen_attribute() {
        let html = render_topic_page("cheque-bounce", None, Some(ServiceType::LegalNotice));
        assert!(html.contains("data-autopen-service=\"legal-notice\""));

        let plain = render_topic_page("cheque-bounce", None, None);
        assert!(!plain.contains("data-autopen-service"));
    }

    #[test]
    fn consultation_page_renders() {
        let html = render_consultation_page("pune", None);
        assert!(html.contains("Talk to a Lawyer in Pune"));
        assert!(html.contains("data-service=\"consultation\""));
    }

    #[test]
    fn html_escapes_angle_brackets_in_copy() {
        // Unknown topics flow through the fallback; the title derives from
        // the slug and must come out escaped.
        let html = render_topic_page("<script>alert(1)</script>", None, None);
        assert!(!html.contains("<script>alert(1)</script>"));
    }
}
