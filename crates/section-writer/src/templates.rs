//! Static instruction table for report sections

/// Instruction and knowledge-search query for one section id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionTemplate {
    pub section_id: &'static str,
    /// Keywords used to pull reference chunks for this section
    pub search_query: &'static str,
    /// Section-specific writing brief appended to the shared instructions
    pub instruction: &'static str,
}

/// Shared writing and table-format rules prepended to every request
pub const BASE_INSTRUCTIONS: &str = "\
You are a professional financial report writer analysing a manufacturing or business project.

WRITING STYLE:
- Formal business report prose in clear paragraphs (3-5 unless stated otherwise)
- Reference the supplied spreadsheet figures where appropriate

TABLE FORMAT (use exactly this, no HTML, no Markdown tables):
[TABLE:Table Title]
Header1|Header2|Header3
Row1Col1|Row1Col2|Row1Col3
[/TABLE]
- Separate columns with a pipe (|)
- The first row after [TABLE:...] is always the header row
- Give every table a meaningful title";

/// Brief used when a section id has no entry in [`SECTION_TEMPLATES`]
pub const GENERIC_INSTRUCTION: &str = "\
Write this section of the report using the spreadsheet figures provided. \
Include relevant tables in the [TABLE:...][/TABLE] format.";

pub static SECTION_TEMPLATES: &[SectionTemplate] = &[
    SectionTemplate {
        section_id: "executive_summary",
        search_query: "project summary financial assistance manufacturing",
        instruction: "Write an Executive Summary covering the project overview and nature of business, \
total project cost and funding structure, key financial indicators (profitability, ROI, payback), \
employment generation and an overall viability assessment. Keep it to 200-300 words.",
    },
    SectionTemplate {
        section_id: "project_profile",
        search_query: "project profile overview business details",
        instruction: "Write a Project Profile Overview describing the promoter, location, products, \
capacity and cost of project. End with a [TABLE:Project Profile Summary] table. Minimum 450 words.",
    },
    SectionTemplate {
        section_id: "firm_constitution",
        search_query: "firm constitution partnership proprietorship company",
        instruction: "Describe the constitution of the firm, its legal form and the promoters or partners. \
Include a [TABLE:Promoter/Partner Details] table.",
    },
    SectionTemplate {
        section_id: "product_characteristics",
        search_query: "product characteristics market analysis demand",
        instruction: "Describe the product characteristics, target market, demand drivers and competition.",
    },
    SectionTemplate {
        section_id: "swot_analysis",
        search_query: "SWOT analysis strengths weaknesses opportunities threats",
        instruction: "Write a SWOT analysis and present it as a [TABLE:SWOT Analysis Matrix] table \
with one column each for strengths, weaknesses, opportunities and threats.",
    },
    SectionTemplate {
        section_id: "project_description",
        search_query: "project description manufacturing business",
        instruction: "Give a detailed project description: activities, site, utilities and implementation schedule.",
    },
    SectionTemplate {
        section_id: "manufacturing_process",
        search_query: "manufacturing process production flowchart operations",
        instruction: "Describe the manufacturing process step by step as a flow from raw material to dispatch.",
    },
    SectionTemplate {
        section_id: "plant_machinery",
        search_query: "plant machinery equipment technical specifications",
        instruction: "Describe the plant and machinery with a [TABLE:Plant & Machinery Cost Details] table \
built from the spreadsheet figures.",
    },
    SectionTemplate {
        section_id: "inventory_details",
        search_query: "inventory stock raw materials working capital",
        instruction: "Explain inventory and stock management: raw material holding, finished goods and reorder policy.",
    },
    SectionTemplate {
        section_id: "transportation",
        search_query: "transportation logistics distribution",
        instruction: "Describe inbound and outbound transportation and distribution logistics.",
    },
    SectionTemplate {
        section_id: "land_requirements",
        search_query: "land building requirements infrastructure",
        instruction: "Describe land and building requirements, built-up area and infrastructure.",
    },
    SectionTemplate {
        section_id: "financial_analysis",
        search_query: "financial analysis profitability balance sheet",
        instruction: "Interpret the projected profit and loss account and balance sheet. Include a \
[TABLE:Profitability Analysis - Multi-Year] table and a [TABLE:Balance Sheet Summary] table.",
    },
    SectionTemplate {
        section_id: "ratio_interpretation",
        search_query: "ratio analysis DSCR current ratio financial ratios banking norms",
        instruction: "Interpret each key ratio (DSCR, interest coverage, current ratio, quick ratio, \
net profit ratio, ROA, ROE, turnover ratios, debt-equity, TOL/TNW): its value, trend across years \
and whether it meets banking norms. Include a [TABLE:Key Financial Ratios - Multi-Year Analysis] table. \
Minimum 600 words.",
    },
    SectionTemplate {
        section_id: "mpbf_calculation",
        search_query: "MPBF calculation working capital turnover method",
        instruction: "Explain the Maximum Permissible Bank Finance under the turnover method and the \
current asset method, the Nayak Committee norms and the working capital margin.",
    },
    SectionTemplate {
        section_id: "cash_flow_projection",
        search_query: "cash flow projection statements operating investing financing",
        instruction: "Analyse projected cash flows from operating, investing and financing activities \
and the closing cash position. Include a year-wise cash flow table. Minimum 500 words.",
    },
    SectionTemplate {
        section_id: "funds_flow_analysis",
        search_query: "funds flow statement sources applications capital",
        instruction: "Analyse sources and applications of funds and changes in working capital, \
with a [TABLE:Sources and Applications of Funds] table. Minimum 500 words.",
    },
    SectionTemplate {
        section_id: "loan_eligibility",
        search_query: "loan eligibility criteria financial assistance",
        instruction: "Assess loan eligibility against scheme guidelines and banking norms (DSCR, \
debt-equity, current ratio, margin money, subsidy). Include an eligibility checklist table and state \
which criteria are met. Minimum 550 words.",
    },
    SectionTemplate {
        section_id: "recommendations",
        search_query: "recommendations project viability assessment",
        instruction: "Give recommendations and conclusions: viability, key strengths, risks and \
mitigations, compliance review and a final recommendation (approve, reject or conditional approval) \
with suggested loan terms. Minimum 600 words.",
    },
];

/// Look up the template for a section id
pub fn section_template(section_id: &str) -> Option<&'static SectionTemplate> {
    SECTION_TEMPLATES.iter().find(|t| t.section_id == section_id)
}

/// Knowledge query for a section, falling back to the id itself
pub fn search_query(section_id: &str) -> String {
    match section_template(section_id) {
        Some(template) => template.search_query.to_string(),
        None => section_id.replace('_', " "),
    }
}

/// Section-specific brief, falling back to the generic one
pub fn instruction(section_id: &str) -> &'static str {
    section_template(section_id)
        .map(|t| t.instruction)
        .unwrap_or(GENERIC_INSTRUCTION)
}
