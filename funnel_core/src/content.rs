//! Content resolution for generated marketing pages.
//!
//! Resolution is an ordered chain of lookup strategies, evaluated lazily —
//! first match wins:
//!
//! 1. exact match in the per-topic content map;
//! 2. match in the legacy map, keyed by substring heuristics on the topic
//!    title (the old site grouped topics into a few copy families);
//! 3. the generic fallback.
//!
//! The fallback guarantees the resolver never returns blank content for an
//! unmapped topic.  FAQ resolution is layered independently and, when a
//! city is supplied, appends one city-specific item regardless of which
//! base list matched.  Everything here is pure lookup: no state, no I/O.

use serde::{Deserialize, Serialize};

use crate::catalog;

/// Copy block for a topic page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicContent {
    pub hero_title: String,
    pub hero_subtitle: String,
    pub benefits: Vec<String>,
    pub who_needs_this: Vec<String>,
    pub documents_needed: Vec<String>,
    pub deliverables: Vec<String>,
    /// Always exactly four steps.
    pub process: Vec<ProcessStep>,
    pub timeline: Vec<TimelineRow>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessStep {
    pub title: String,
    pub detail: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineRow {
    pub stage: String,
    pub duration: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Faq {
    pub question: String,
    pub answer: String,
}

fn step(title: &str, detail: &str) -> ProcessStep {
    ProcessStep {
        title: title.to_string(),
        detail: detail.to_string(),
    }
}

fn row(stage: &str, duration: &str) -> TimelineRow {
    TimelineRow {
        stage: stage.to_string(),
        duration: duration.to_string(),
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// The standard drafting-and-dispatch process; most topics share it.
fn standard_process() -> Vec<ProcessStep> {
    vec![
        step(
            "Share your case details",
            "Tell us the facts over WhatsApp or a short call. A case manager collects the documents that matter.",
        ),
        step(
            "Lawyer review",
            "A lawyer experienced in this area reviews the facts and confirms the strongest legal grounds.",
        ),
        step(
            "Drafting and your approval",
            "You receive the draft notice for review. Revisions are included until you approve it.",
        ),
        step(
            "Dispatch and follow-up",
            "The signed notice is dispatched by registered post and email, with proof of delivery shared with you.",
        ),
    ]
}

fn standard_timeline() -> Vec<TimelineRow> {
    vec![
        row("Case review", "Same day"),
        row("First draft", "1–2 working days"),
        row("Revisions and approval", "1 working day"),
        row("Dispatch with tracking", "1 working day"),
    ]
}

// ─────────────────────────────────────────────────────────
// Strategy 1 — per-topic content
// ─────────────────────────────────────────────────────────

fn specific_content(topic_key: &str, title: &str) -> Option<TopicContent> {
    match topic_key {
        "cheque-bounce" => Some(TopicContent {
            hero_title: format!("Send a {title} Legal Notice"),
            hero_subtitle: "Recover your money under Section 138 of the Negotiable Instruments Act. Notice must be sent within 30 days of the cheque return memo.".to_string(),
            benefits: strings(&[
                "Drafted by lawyers who handle Section 138 matters daily",
                "Dispatched within the strict 30-day statutory window",
                "Registered post with acknowledgement due, plus email copy",
                "Clear next steps if the drawer fails to pay within 15 days",
            ]),
            who_needs_this: strings(&[
                "Anyone holding a cheque returned with 'insufficient funds' or 'account closed'",
                "Businesses with dishonoured payments from customers or vendors",
                "Lenders whose repayment cheques have bounced",
            ]),
            documents_needed: strings(&[
                "The original dishonoured cheque",
                "Bank return memo stating the reason for dishonour",
                "Proof of the underlying debt or invoice",
            ]),
            deliverables: strings(&[
                "Lawyer-signed demand notice under Section 138",
                "Dispatch via registered post with tracking",
                "Proof of delivery for court use",
            ]),
            process: standard_process(),
            timeline: standard_timeline(),
        }),
        "money-recovery" => Some(TopicContent {
            hero_title: format!("{title} Legal Notice"),
            hero_subtitle: "A formal demand notice is the first and often the only step needed to recover money owed to you.".to_string(),
            benefits: strings(&[
                "Most recipients settle after a lawyer's notice, avoiding court",
                "Establishes a documented demand for any later suit",
                "Interest and costs claimed alongside the principal",
                "Follow-up guidance on summary suits under Order 37 CPC",
            ]),
            who_needs_this: strings(&[
                "Individuals owed money by friends, relatives or acquaintances",
                "Businesses with unpaid invoices or advances",
                "Landlords and service providers with outstanding dues",
            ]),
            documents_needed: strings(&[
                "Proof of the amount owed (agreement, invoice, transfer record)",
                "Any written acknowledgement of the debt",
                "Communication trail with the debtor",
            ]),
            deliverables: strings(&[
                "Lawyer-signed demand notice with a payment deadline",
                "Registered post dispatch with tracking",
                "A recovery-options consultation if the deadline lapses",
            ]),
            process: standard_process(),
            timeline: standard_timeline(),
        }),
        "divorce-notice" => Some(TopicContent {
            hero_title: format!("{title} — Start the Process Formally"),
            hero_subtitle: "A legal notice communicates your intent formally and often opens the door to a mutual settlement.".to_string(),
            benefits: strings(&[
                "Handled with complete confidentiality",
                "Drafted by family-law specialists",
                "Sets out your position on maintenance, custody and property",
                "Often leads to mutual-consent terms without litigation",
            ]),
            who_needs_this: strings(&[
                "Spouses intending to initiate divorce proceedings",
                "Anyone seeking to formalise separation terms",
                "Spouses responding to desertion or cruelty",
            ]),
            documents_needed: strings(&[
                "Marriage certificate or proof of marriage",
                "Details of children, assets and income",
                "Any prior correspondence or police complaints",
            ]),
            deliverables: strings(&[
                "Lawyer-signed notice stating grounds and intended relief",
                "Confidential dispatch with delivery proof",
                "A follow-up consultation on next steps",
            ]),
            process: standard_process(),
            timeline: standard_timeline(),
        }),
        "tenant-eviction" => Some(TopicContent {
            hero_title: format!("{title} Notice to Your Tenant"),
            hero_subtitle: "A properly served eviction notice is a legal precondition to recovering possession of your property.".to_string(),
            benefits: strings(&[
                "Complies with the notice periods in your state's rent laws",
                "Covers arrears of rent alongside possession",
                "Serves as the foundation of any later eviction suit",
                "Dispatch with delivery proof that stands up in court",
            ]),
            who_needs_this: strings(&[
                "Landlords with tenants refusing to vacate after expiry",
                "Owners facing chronic non-payment of rent",
                "Landlords needing the premises for bona fide use",
            ]),
            documents_needed: strings(&[
                "Rent agreement or leave-and-licence deed",
                "Rent payment records showing arrears",
                "Ownership proof of the premises",
            ]),
            deliverables: strings(&[
                "Lawyer-signed quit notice with the statutory period",
                "Registered post dispatch with tracking",
                "Guidance on filing the eviction petition if ignored",
            ]),
            process: standard_process(),
            timeline: standard_timeline(),
        }),
        "consumer-complaint" => Some(TopicContent {
            hero_title: format!("{title} Legal Notice"),
            hero_subtitle: "Put the seller or service provider on formal notice before approaching the consumer commission.".to_string(),
            benefits: strings(&[
                "Most companies resolve complaints after a legal notice",
                "Claims refund, replacement and compensation together",
                "Prepares the record for a consumer-commission complaint",
                "Covers e-commerce, services and offline purchases alike",
            ]),
            who_needs_this: strings(&[
                "Buyers of defective products the seller refuses to replace",
                "Customers who paid for services that were never delivered",
                "Consumers facing unfair trade practices",
            ]),
            documents_needed: strings(&[
                "Invoice or order confirmation",
                "Photos or reports evidencing the defect or deficiency",
                "Complaint correspondence with the seller",
            ]),
            deliverables: strings(&[
                "Lawyer-signed notice with a compliance deadline",
                "Dispatch to the registered office with tracking",
                "Consumer-commission guidance if the deadline lapses",
            ]),
            process: standard_process(),
            timeline: standard_timeline(),
        }),
        "unpaid-salary" => Some(TopicContent {
            hero_title: format!("{title} — Demand What You Earned"),
            hero_subtitle: "A legal notice to your employer for withheld salary, full-and-final settlement or reimbursements.".to_string(),
            benefits: strings(&[
                "Employers typically settle before labour-court escalation",
                "Claims salary, FnF dues and statutory benefits together",
                "Preserves your rights under shops-and-establishments law",
                "Discreet handling; your current employment is not named",
            ]),
            who_needs_this: strings(&[
                "Employees whose salary or FnF settlement is withheld",
                "Resigned staff waiting months for dues and documents",
                "Contract workers with unpaid invoices to a single employer",
            ]),
            documents_needed: strings(&[
                "Offer letter or employment contract",
                "Salary slips and bank statements",
                "Resignation acceptance and FnF communication",
            ]),
            deliverables: strings(&[
                "Lawyer-signed demand notice to the employer",
                "Registered post dispatch with tracking",
                "Guidance on labour-authority escalation",
            ]),
            process: standard_process(),
            timeline: standard_timeline(),
        }),
        _ => None,
    }
}

// ─────────────────────────────────────────────────────────
// Strategy 2 — legacy copy families, keyed by title substrings
// ─────────────────────────────────────────────────────────

fn legacy_content(title: &str) -> Option<TopicContent> {
    let lower = title.to_lowercase();

    // Tenancy titles like "Rent Recovery" must land in the property
    // family, so those keywords are checked before the generic
    // "recovery" match.
    let (subtitle, who) = if lower.contains("property")
        || lower.contains("tenant")
        || lower.contains("rent")
        || lower.contains("landlord")
        || lower.contains("possession")
        || lower.contains("builder")
        || lower.contains("encroachment")
    {
        (
            "Protect your property rights with a notice that stands up in court.",
            &[
                "Owners and landlords asserting possession or dues",
                "Buyers facing builder delays or agreement defaults",
                "Occupants facing illegal dispossession",
            ][..],
        )
    } else if lower.contains("recovery")
        || lower.contains("cheque")
        || lower.contains("loan")
        || lower.contains("invoice")
        || lower.contains("payment")
    {
        (
            "Recover what you are owed with a formal lawyer-drafted demand notice.",
            &[
                "Individuals and businesses owed money",
                "Creditors with dishonoured or delayed payments",
                "Anyone needing a documented demand before suing",
            ][..],
        )
    } else if lower.contains("divorce")
        || lower.contains("custody")
        || lower.contains("maintenance")
        || lower.contains("matrimonial")
        || lower.contains("dowry")
        || lower.contains("domestic")
    {
        (
            "Family matters handled with confidentiality and care by specialist lawyers.",
            &[
                "Spouses formalising separation or settlement terms",
                "Parents asserting custody or maintenance rights",
                "Anyone facing harassment within a marriage",
            ][..],
        )
    } else if lower.contains("termination")
        || lower.contains("salary")
        || lower.contains("gratuity")
        || lower.contains("bond")
        || lower.contains("provident")
        || lower.contains("workplace")
    {
        (
            "Assert your employment rights without burning bridges.",
            &[
                "Employees with withheld dues or benefits",
                "Staff facing wrongful termination or bond pressure",
                "Workers escalating unresolved HR grievances",
            ][..],
        )
    } else if lower.contains("consumer")
        || lower.contains("refund")
        || lower.contains("product")
        || lower.contains("service")
        || lower.contains("insurance")
    {
        (
            "Hold sellers and service providers to account before the consumer commission.",
            &[
                "Consumers with defective goods or deficient services",
                "Policyholders with rejected insurance claims",
                "Buyers chasing refunds that never arrive",
            ][..],
        )
    } else {
        return None;
    };

    Some(TopicContent {
        hero_title: format!("Send a {title} Legal Notice"),
        hero_subtitle: subtitle.to_string(),
        benefits: strings(&[
            "Drafted and signed by an experienced lawyer",
            "Dispatched by registered post with delivery proof",
            "Free revisions until you approve the draft",
            "Follow-up consultation on next steps included",
        ]),
        who_needs_this: strings(who),
        documents_needed: strings(&[
            "Documents evidencing your claim",
            "Identity and address details of the other party",
            "Any prior correspondence about the dispute",
        ]),
        deliverables: strings(&[
            "Lawyer-signed legal notice",
            "Registered post dispatch with tracking",
            "Proof of delivery for your records",
        ]),
        process: standard_process(),
        timeline: standard_timeline(),
    })
}

// ─────────────────────────────────────────────────────────
// Strategy 3 — generic fallback
// ─────────────────────────────────────────────────────────

fn fallback_content(title: &str) -> TopicContent {
    TopicContent {
        hero_title: format!("Send a {title} Legal Notice"),
        hero_subtitle: "Get a lawyer-drafted legal notice sent on your behalf, with delivery proof and follow-up guidance.".to_string(),
        benefits: strings(&[
            "Drafted and signed by an experienced lawyer",
            "Dispatched by registered post with delivery proof",
            "Free revisions until you approve the draft",
            "Follow-up consultation on next steps included",
        ]),
        who_needs_this: strings(&[
            "Anyone asserting a legal right formally before litigation",
            "Parties seeking settlement without going to court",
            "Businesses documenting a dispute for the record",
        ]),
        documents_needed: strings(&[
            "Documents evidencing your claim",
            "Identity and address details of the other party",
            "Any prior correspondence about the dispute",
        ]),
        deliverables: strings(&[
            "Lawyer-signed legal notice",
            "Registered post dispatch with tracking",
            "Proof of delivery for your records",
        ]),
        process: standard_process(),
        timeline: standard_timeline(),
    }
}

/// Resolve the copy block for a topic page.
///
/// `topic_key` may be any string; unknown keys fall through the chain to
/// the generic fallback, so this never returns empty content.  A supplied
/// `city` personalises the hero subtitle.
pub fn resolve_content(topic_key: &str, city: Option<&str>) -> TopicContent {
    let title = catalog::topic_title(topic_key)
        .map(str::to_string)
        .unwrap_or_else(|| catalog::city_display_name(topic_key));

    let mut content = specific_content(topic_key, &title)
        .or_else(|| legacy_content(&title))
        .unwrap_or_else(|| fallback_content(&title));

    if let Some(city_slug) = city {
        let city_name = catalog::city_display_name(city_slug);
        content.hero_subtitle = format!(
            "{} Our lawyers serve clients across {city_name}.",
            content.hero_subtitle
        );
    }

    content
}

// ─────────────────────────────────────────────────────────
// FAQ resolution — independently layered
// ─────────────────────────────────────────────────────────

fn faq(question: &str, answer: &str) -> Faq {
    Faq {
        question: question.to_string(),
        answer: answer.to_string(),
    }
}

/// Layer 1: comprehensive per-topic FAQ map.
fn comprehensive_faqs(topic_key: &str) -> Option<Vec<Faq>> {
    match topic_key {
        "cheque-bounce" => Some(vec![
            faq(
                "Is there a deadline for sending a cheque bounce notice?",
                "Yes. The demand notice must be sent within 30 days of receiving the bank's return memo. Missing this window weakens a Section 138 prosecution.",
            ),
            faq(
                "What happens after the notice is delivered?",
                "The drawer has 15 days to pay. If they do not, you may file a complaint before the magistrate within the following month.",
            ),
            faq(
                "Can I claim interest on the cheque amount?",
                "The notice demands the cheque amount; interest and costs can be pursued in subsequent proceedings.",
            ),
        ]),
        "money-recovery" => Some(vec![
            faq(
                "Will a legal notice actually get my money back?",
                "In a large share of cases, a formal demand from a lawyer prompts settlement without court. If not, the notice strengthens your suit.",
            ),
            faq(
                "Is there a time limit on recovering money?",
                "Most money claims are governed by a three-year limitation period from when the debt fell due. Acting early preserves your options.",
            ),
        ]),
        "divorce-notice" => Some(vec![
            faq(
                "Will my spouse find out who drafted the notice?",
                "The notice is sent under the lawyer's letterhead. Your consultation and instructions remain confidential.",
            ),
            faq(
                "Does a notice mean the divorce has started?",
                "No. It formally communicates intent and your terms. Proceedings begin only when a petition is filed in court.",
            ),
        ]),
        _ => None,
    }
}

/// Layer 2: legacy per-topic FAQ map.
fn legacy_faqs(topic_key: &str) -> Option<Vec<Faq>> {
    match topic_key {
        "tenant-eviction" | "rent-recovery" | "landlord-harassment" => Some(vec![
            faq(
                "How much notice must I give a tenant?",
                "The period depends on your rent agreement and state law; commonly 15 days to one month. The notice we draft uses the correct statutory period.",
            ),
            faq(
                "Can I change the locks if the tenant ignores the notice?",
                "No. Self-help eviction is illegal. The notice is the precondition for an eviction suit, which is the lawful route.",
            ),
        ]),
        "consumer-complaint" | "defective-product" | "deficiency-in-service" => Some(vec![
            faq(
                "Do I need a notice before filing a consumer complaint?",
                "It is not always mandatory, but a notice usually resolves the matter faster and strengthens the complaint if it does not.",
            ),
            faq(
                "What compensation can I ask for?",
                "Refund or replacement, plus compensation for deficiency and litigation costs, depending on the facts.",
            ),
        ]),
        _ => None,
    }
}

/// Layer 3: generic FAQ list.
fn generic_faqs() -> Vec<Faq> {
    vec![
        faq(
            "How long does it take to send the notice?",
            "Most notices are drafted within 1–2 working days and dispatched the day you approve the draft.",
        ),
        faq(
            "Is sending a legal notice mandatory before going to court?",
            "For several kinds of cases it is required; for the rest it is strongly advisable, since many disputes settle at this stage.",
        ),
        faq(
            "What if the other party ignores the notice?",
            "You lose nothing — the notice becomes evidence of your demand, and our lawyer advises you on the right forum to escalate.",
        ),
    ]
}

/// Resolve the FAQ list for a topic page.
///
/// Chain: comprehensive map → legacy map → generic list.  A supplied city
/// appends one city-specific item regardless of which base list matched.
pub fn resolve_faqs(topic_key: &str, city: Option<&str>) -> Vec<Faq> {
    let mut faqs = comprehensive_faqs(topic_key)
        .or_else(|| legacy_faqs(topic_key))
        .unwrap_or_else(generic_faqs);

    if let Some(city_slug) = city {
        let city_name = catalog::city_display_name(city_slug);
        faqs.push(faq(
            &format!("Do you have lawyers in {city_name}?"),
            &format!(
                "Yes. Notices for clients in {city_name} are drafted by lawyers familiar with the local courts, and everything is handled online — no office visit needed."
            ),
        ));
    }

    faqs
}
