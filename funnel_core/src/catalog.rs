//! Fixed catalogs: the cities we generate pages for and the legal-notice
//! topics we cover.  Both lists are deliberately static — page generation,
//! sitemap emission, and location validation all key off them.

/// City slugs, in page-generation order.  The topic × city product is
/// capped by [`crate::routes::RouteCaps`], so order matters: earlier
/// cities get combination pages.
pub const CITIES: &[&str] = &[
    "mumbai",
    "delhi",
    "bangalore",
    "hyderabad",
    "ahmedabad",
    "chennai",
    "kolkata",
    "pune",
    "jaipur",
    "surat",
    "lucknow",
    "kanpur",
    "nagpur",
    "indore",
    "thane",
    "bhopal",
    "visakhapatnam",
    "patna",
    "vadodara",
    "ghaziabad",
    "ludhiana",
    "agra",
    "nashik",
    "faridabad",
    "meerut",
    "rajkot",
    "varanasi",
    "srinagar",
    "aurangabad",
    "dhanbad",
    "amritsar",
    "navi-mumbai",
    "prayagraj",
    "ranchi",
    "howrah",
    "coimbatore",
    "jabalpur",
    "gwalior",
    "vijayawada",
    "jodhpur",
    "madurai",
    "raipur",
    "kota",
    "guwahati",
    "chandigarh",
    "gurgaon",
    "noida",
    "mysore",
    "bhubaneswar",
    "kochi",
    "dehradun",
];

/// Legal-notice topic identifiers, in page-generation order.
pub const TOPICS: &[(&str, &str)] = &[
    ("cheque-bounce", "Cheque Bounce"),
    ("money-recovery", "Recovery of Money"),
    ("loan-default", "Loan Default"),
    ("unpaid-invoice", "Non-Payment of Invoice"),
    ("breach-of-contract", "Breach of Contract"),
    ("security-deposit-refund", "Security Deposit Refund"),
    ("tenant-eviction", "Tenant Eviction"),
    ("rent-recovery", "Rent Recovery"),
    ("landlord-harassment", "Landlord Harassment"),
    ("property-dispute", "Property Dispute"),
    ("property-partition", "Property Partition"),
    ("illegal-possession", "Illegal Possession"),
    ("builder-delay", "Builder Possession Delay"),
    ("real-estate-rera", "RERA Complaint"),
    ("divorce-notice", "Divorce Notice"),
    ("mutual-divorce", "Mutual Divorce"),
    ("child-custody", "Child Custody"),
    ("maintenance-claim", "Maintenance Claim"),
    ("dowry-harassment", "Dowry Harassment"),
    ("domestic-violence", "Domestic Violence"),
    ("matrimonial-cruelty", "Matrimonial Cruelty"),
    ("employment-termination", "Wrongful Termination"),
    ("unpaid-salary", "Unpaid Salary"),
    ("service-bond-recovery", "Service Bond Recovery"),
    ("gratuity-claim", "Gratuity Claim"),
    ("provident-fund-claim", "Provident Fund Claim"),
    ("workplace-harassment", "Workplace Harassment"),
    ("consumer-complaint", "Consumer Complaint"),
    ("defective-product", "Defective Product"),
    ("deficiency-in-service", "Deficiency in Service"),
    ("insurance-claim-rejection", "Insurance Claim Rejection"),
    ("e-commerce-refund", "E-commerce Refund"),
    ("travel-refund", "Travel Refund"),
    ("education-fee-refund", "Education Fee Refund"),
    ("credit-card-dispute", "Credit Card Dispute"),
    ("bank-dispute", "Bank Dispute"),
    ("chit-fund-fraud", "Chit Fund Fraud"),
    ("cyber-fraud", "Cyber Fraud"),
    ("online-harassment", "Online Harassment"),
    ("data-privacy-violation", "Data Privacy Violation"),
    ("defamation", "Defamation"),
    ("criminal-intimidation", "Criminal Intimidation"),
    ("medical-negligence", "Medical Negligence"),
    ("motor-accident-claim", "Motor Accident Claim"),
    ("partnership-dispute", "Partnership Dispute"),
    ("shareholder-dispute", "Shareholder Dispute"),
    ("franchise-dispute", "Franchise Dispute"),
    ("vendor-dispute", "Vendor Dispute"),
    ("trademark-infringement", "Trademark Infringement"),
    ("copyright-infringement", "Copyright Infringement"),
    ("will-dispute", "Will Dispute"),
    ("succession-certificate", "Succession Certificate"),
    ("gift-deed-dispute", "Gift Deed Dispute"),
    ("society-dispute", "Housing Society Dispute"),
    ("noise-pollution", "Noise Pollution"),
    ("encroachment", "Encroachment"),
    ("power-of-attorney-misuse", "Power of Attorney Misuse"),
    ("sale-agreement-default", "Sale Agreement Default"),
    ("neighbour-dispute", "Neighbour Dispute"),
];

/// Look up a topic title by slug.
pub fn topic_title(slug: &str) -> Option<&'static str> {
    TOPICS
        .iter()
        .find(|(s, _)| *s == slug)
        .map(|(_, title)| *title)
}

/// Whether `slug` is one of the catalogued cities.
pub fn is_known_city(slug: &str) -> bool {
    CITIES.contains(&slug)
}

/// Turn a URL city slug into a display name: hyphens become spaces and
/// each word is title-cased (`"navi-mumbai"` → `"Navi Mumbai"`).
pub fn city_display_name(slug: &str) -> String {
    slug.split('-')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
