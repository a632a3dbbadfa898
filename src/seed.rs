//! Built-in catalog written to an empty store on first load.

use uuid::Uuid;

use crate::debate_model::{Category, CategoryId, Stance, SubItem, SubItemId, DEFAULT_MY_TAKE};

fn lines(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn stance(summary: &str, reasoning: &str, sources: &[&str]) -> Stance {
    Stance {
        summary: summary.to_string(),
        reasoning: reasoning.to_string(),
        sources: lines(sources),
    }
}

/// Name-derived, so every call yields the same ids.
fn seed_id(name: &str) -> SubItemId {
    SubItemId(Uuid::new_v5(
        &Uuid::NAMESPACE_OID,
        format!("debate-catalog/seed/{name}").as_bytes(),
    ))
}

fn topic(
    name: &str,
    question: &str,
    republican: Stance,
    democratic: Stance,
    vocabulary: &[&str],
) -> SubItem {
    SubItem {
        id: seed_id(name),
        name: name.to_string(),
        topic: question.to_string(),
        republican,
        democratic,
        vocabulary: lines(vocabulary),
        my_take: DEFAULT_MY_TAKE.to_string(),
    }
}

/// The default categories. Topic ids are stable across calls.
pub fn default_categories() -> Vec<Category> {
    vec![
        Category {
            id: CategoryId(1),
            title: "Government & Constitution".to_string(),
            sub_items: vec![
                topic(
                    "Limited Government",
                    "Should the federal government have limited power with more authority left to individual states?",
                    stance(
                        "The federal government should have restricted powers, allowing states to govern themselves according to local needs and values.",
                        "Believes in constitutional limits, individual liberty, local control, and that government closest to the people governs best.",
                        &[
                            "Heritage Foundation study showing state-level solutions are more responsive to citizen needs (2020)",
                            "Tenth Amendment Center research on federalism effectiveness",
                            "https://www.heritage.org",
                        ],
                    ),
                    stance(
                        "Federal government needs sufficient power to ensure equal rights, national standards, and address issues that cross state lines.",
                        "Believes in equity, civil rights protection, national unity, and preventing a patchwork of conflicting state laws.",
                        &[
                            "Brookings Institution analysis of federal role in civil rights enforcement",
                            "Economic Policy Institute data on interstate commerce regulation benefits",
                            "Historical examples of federal intervention ensuring equal rights",
                        ],
                    ),
                    &[
                        "Federalism vs States Rights",
                        "Constitutional originalism vs Living Constitution",
                        "Local control vs National standards",
                        "Tenth Amendment vs Commerce Clause",
                    ],
                ),
                topic(
                    "Individual Liberty",
                    "How should we balance individual freedoms with collective safety and social responsibility?",
                    stance(
                        "Individual rights and freedoms should be maximally protected, with minimal government interference in personal choices.",
                        "Values personal responsibility, constitutional rights, limited government, and believes freedom leads to prosperity and happiness.",
                        &[
                            "Cato Institute research on economic freedom correlating with prosperity",
                            "Constitutional analysis of Bill of Rights protections",
                            "https://www.cato.org",
                        ],
                    ),
                    stance(
                        "Individual freedoms are important but must be balanced with collective welfare and preventing harm to others.",
                        "Believes in social responsibility, common good, protecting vulnerable populations, and that some restrictions prevent greater harms.",
                        &[
                            "Public health studies on collective action benefits",
                            "Social science research on community welfare vs individual choice",
                            "Historical analysis of regulated freedoms improving society",
                        ],
                    ),
                    &[
                        "Liberty vs License",
                        "Positive rights vs Negative rights",
                        "Personal responsibility vs Social safety net",
                        "Individual choice vs Collective good",
                    ],
                ),
            ],
        },
        Category {
            id: CategoryId(2),
            title: "Economy & Taxes".to_string(),
            sub_items: vec![
                topic(
                    "Lower Taxes",
                    "Should taxes be reduced to stimulate economic growth, or maintained/increased to fund government services?",
                    stance(
                        "Lower taxes stimulate economic growth by allowing individuals and businesses to keep more of their earnings for investment and spending.",
                        "Believes in supply-side economics, individual ownership of earnings, free market efficiency, and that prosperity benefits everyone.",
                        &[
                            "Tax Foundation analysis showing correlation between low taxes and economic growth",
                            "Historical data from Reagan and Kennedy tax cuts",
                            "https://taxfoundation.org",
                        ],
                    ),
                    stance(
                        "Adequate taxation is necessary to fund essential services, infrastructure, and social programs that benefit society.",
                        "Believes in progressive taxation, social investment, income inequality reduction, and that public services require funding.",
                        &[
                            "Congressional Budget Office analysis of public investment returns",
                            "International comparisons of tax rates and social outcomes",
                            "Economic research on infrastructure spending multiplier effects",
                        ],
                    ),
                    &[
                        "Supply-side vs Demand-side economics",
                        "Tax burden vs Public investment",
                        "Trickle-down vs Bottom-up economics",
                        "Fiscal responsibility vs Social spending",
                    ],
                ),
            ],
        },
        Category {
            id: CategoryId(3),
            title: "Society & Culture".to_string(),
            sub_items: vec![
                topic(
                    "Traditional Family Values",
                    "What role should traditional family structures play in society and policy-making?",
                    stance(
                        "Traditional family structures (married parents with children) provide stability and should be supported through policy and culture.",
                        "Values stability, proven social structures, religious principles, and believes strong families create strong communities.",
                        &[
                            "Social science research on child outcomes in two-parent households",
                            "Heritage Foundation studies on family structure and economic mobility",
                            "https://www.heritage.org",
                        ],
                    ),
                    stance(
                        "Families come in many forms and all should be supported equally, without privileging one structure over others.",
                        "Values diversity, inclusion, equality, and believes love and commitment matter more than specific family configurations.",
                        &[
                            "American Psychological Association research on diverse family outcomes",
                            "Studies showing success across various family structures",
                            "Legal analysis of equal protection under family law",
                        ],
                    ),
                    &[
                        "Traditional vs Non-traditional families",
                        "Nuclear family vs Extended family",
                        "Family values vs Family diversity",
                        "Moral foundation vs Social evolution",
                    ],
                ),
            ],
        },
    ]
}
