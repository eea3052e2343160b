use std::fmt;

use crate::canvas::Rgb;

/// Output language for every fixed label drawn on a page.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Language {
    #[default]
    Dutch,
    English,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Label {
    TimeFrame(TimeFrame),
    ResearchLine(ResearchLine),
    Priority(Priority),
    Barrier(StormSurgeBarrier),
    Related,
    PriorityTitle,
    WaterSafety,
    OtherFunctions,
    Operation,
    Maintenance,
    ActionHolder,
    Costs,
    LeadTime,
    NoResearchLine,
    ImpactPathway,
}

impl Label {
    pub fn text(self, lang: Language) -> &'static str {
        let (nl, en) = match self {
            Label::TimeFrame(tf) => match tf {
                TimeFrame::NotRelevant => ("Niet relevant", "Not relevant"),
                TimeFrame::Now => ("Nu", "Now"),
                TimeFrame::NearFuture => ("Nabije toekomst", "Near future"),
                TimeFrame::Future => ("Toekomst", "Future"),
                TimeFrame::Unknown => ("Onbekend", "Unknown"),
            },
            Label::ResearchLine(rl) => match rl {
                ResearchLine::ConstructiveAspects => ("Constructieve aspecten", "Structural aspects"),
                ResearchLine::OperatingSystem => ("Besturingssystemen / IA", "Operating system / IA"),
                ResearchLine::Facilities => ("Voorzieningen en gebouwen", "Facilities and buildings"),
                ResearchLine::Maintenance => ("Onderhoud en operatie", "Maintenance"),
                ResearchLine::Cyber => ("Cyber & security", "Cyber & security"),
                ResearchLine::Hydrodynamics => (
                    "Hydrodynamische effecten en belastingen",
                    "Hydrodynamic effects and loads",
                ),
                ResearchLine::ProbabilityOfFailure => ("Faalkans", "Probability of failure"),
                ResearchLine::Adaptation => ("Adaptatie stormvloedkeringen", "Adaptation storm surge barriers"),
                ResearchLine::Organizational => ("Organisatorische aspecten", "Organizational aspects"),
                ResearchLine::Lifespan => (
                    "Restlevensduur huidige objecten",
                    "Remaining lifetime current objects",
                ),
            },
            Label::Priority(p) => match p {
                Priority::High => ("hoog", "high"),
                Priority::Medium => ("middel", "medium"),
                Priority::Low => ("laag", "low"),
                Priority::Unknown => ("onbekend", "unknown"),
            },
            Label::Barrier(b) => match b {
                StormSurgeBarrier::All => ("6SVK", "6SSB"),
                StormSurgeBarrier::MaeslantBarrier => ("Maeslantkering", "Maeslant Storm Barrier"),
                StormSurgeBarrier::HartelBarrier => ("Hartelkering", "Hartel Barrier"),
                StormSurgeBarrier::Ramspol => ("Ramspol", "Ramspol"),
                StormSurgeBarrier::HollandseIJsselBarrier => {
                    ("Hollandsche IJssel Kering", "Hollandsche IJssel Barrier")
                }
                StormSurgeBarrier::EasternScheldtBarrier => ("Oosterscheldekering", "Eastern Scheldt Barrier"),
                StormSurgeBarrier::HaringvlietBarrier => ("Haringvlietsluizen", "Haringvliet Sluices"),
            },
            Label::Related => ("Gerelateerd", "Related"),
            Label::PriorityTitle => ("Prioriteit", "Priority"),
            Label::WaterSafety => ("Waterveiligheid", "Water safety"),
            Label::OtherFunctions => ("Andere functies", "Other functions"),
            Label::Operation => ("Operatie", "Operation"),
            Label::Maintenance => ("B&O", "Maintenance"),
            Label::ActionHolder => ("Actiehouder", "Action holder"),
            Label::Costs => ("Kosten", "Costs"),
            Label::LeadTime => ("Doorlooptijd", "Lead time"),
            Label::NoResearchLine => ("Geen onderzoekslijn", "No research line"),
            Label::ImpactPathway => ("Impactpad", "Impact pathway"),
        };
        match lang {
            Language::Dutch => nl,
            Language::English => en,
        }
    }
}

/// Ordinal priority rating along one axis. `Unknown` counts as 0.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum Priority {
    #[default]
    Unknown,
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn ordinal(self) -> u8 {
        match self {
            Priority::Unknown => 0,
            Priority::Low => 1,
            Priority::Medium => 2,
            Priority::High => 3,
        }
    }

    /// Spreadsheet code: 1..=3, anything else is unknown.
    pub fn from_code(code: i64) -> Self {
        match code {
            1 => Priority::Low,
            2 => Priority::Medium,
            3 => Priority::High,
            _ => Priority::Unknown,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TimeFrame {
    NotRelevant,
    Now,
    NearFuture,
    Future,
    Unknown,
}

impl TimeFrame {
    /// Fraction in [0, 1] by which colours are pulled toward grey for this horizon.
    pub fn grey_fraction(self) -> f32 {
        match self {
            TimeFrame::NotRelevant => 1.0,
            TimeFrame::Now => 0.0,
            TimeFrame::NearFuture => 0.5,
            TimeFrame::Future => 0.7,
            TimeFrame::Unknown => 0.0,
        }
    }

    pub fn from_code(code: i64) -> Self {
        match code {
            0 => TimeFrame::NotRelevant,
            1 => TimeFrame::Now,
            2 => TimeFrame::NearFuture,
            3 => TimeFrame::Future,
            _ => TimeFrame::Unknown,
        }
    }

    /// Overview column index for the three plotted horizons.
    pub fn column_index(self) -> Option<usize> {
        match self {
            TimeFrame::Now => Some(0),
            TimeFrame::NearFuture => Some(1),
            TimeFrame::Future => Some(2),
            TimeFrame::NotRelevant | TimeFrame::Unknown => None,
        }
    }

    pub fn requires_research_line(self) -> bool {
        self.column_index().is_some()
    }

    pub const PLOTTED: [TimeFrame; 3] = [TimeFrame::Now, TimeFrame::NearFuture, TimeFrame::Future];
}

/// The fixed research line taxonomy (numbered 1..=10).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResearchLine {
    ConstructiveAspects,
    OperatingSystem,
    Facilities,
    Maintenance,
    Cyber,
    Hydrodynamics,
    ProbabilityOfFailure,
    Adaptation,
    Organizational,
    Lifespan,
}

const COLOR_GROUP_BASE_COLORS: [Rgb; 3] = [Rgb(0, 112, 192), Rgb(0, 146, 69), Rgb(230, 120, 0)];

impl ResearchLine {
    pub const ALL: [ResearchLine; 10] = [
        ResearchLine::ConstructiveAspects,
        ResearchLine::OperatingSystem,
        ResearchLine::Facilities,
        ResearchLine::Maintenance,
        ResearchLine::Cyber,
        ResearchLine::Hydrodynamics,
        ResearchLine::ProbabilityOfFailure,
        ResearchLine::Adaptation,
        ResearchLine::Organizational,
        ResearchLine::Lifespan,
    ];

    pub fn number(self) -> u8 {
        match self {
            ResearchLine::ConstructiveAspects => 1,
            ResearchLine::OperatingSystem => 2,
            ResearchLine::Facilities => 3,
            ResearchLine::Maintenance => 4,
            ResearchLine::Cyber => 5,
            ResearchLine::Hydrodynamics => 6,
            ResearchLine::ProbabilityOfFailure => 7,
            ResearchLine::Adaptation => 8,
            ResearchLine::Organizational => 9,
            ResearchLine::Lifespan => 10,
        }
    }

    pub fn from_number(number: u8) -> Option<Self> {
        Self::ALL.iter().copied().find(|rl| rl.number() == number)
    }

    /// Colour group (1..=3) used to colour-code and row-align lines on the overview.
    pub fn color_group(self) -> u8 {
        match self.number() {
            1..=4 => 1,
            5..=7 => 2,
            _ => 3,
        }
    }

    pub fn base_color(self) -> Rgb {
        COLOR_GROUP_BASE_COLORS[usize::from(self.color_group() - 1)]
    }

    /// Link key of the detail page dedicated to this line.
    pub fn link_key(self) -> String {
        format!("research-line-{}", self.number())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ImpactCategory {
    SocioEconomicAndEnvironment,
    ReliableBarriers,
    MaintenanceDecisions,
    HumanCapital,
    Example,
}

impl ImpactCategory {
    pub const ALL: [ImpactCategory; 5] = [
        ImpactCategory::SocioEconomicAndEnvironment,
        ImpactCategory::ReliableBarriers,
        ImpactCategory::MaintenanceDecisions,
        ImpactCategory::HumanCapital,
        ImpactCategory::Example,
    ];

    pub fn number(self) -> u8 {
        match self {
            ImpactCategory::SocioEconomicAndEnvironment => 1,
            ImpactCategory::ReliableBarriers => 2,
            ImpactCategory::MaintenanceDecisions => 3,
            ImpactCategory::HumanCapital => 4,
            ImpactCategory::Example => 5,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            ImpactCategory::SocioEconomicAndEnvironment => {
                "SSBs contribute to satisfying socio-economic and environmental needs in the hinterland"
            }
            ImpactCategory::ReliableBarriers => "Reliable SSBs in technically good condition",
            ImpactCategory::MaintenanceDecisions => {
                "Well-balanced maintenance and end-of-life decisions for the SSBs by including the system, technical and economical perspective."
            }
            ImpactCategory::HumanCapital => "Human capital for a safe and liveable delta",
            ImpactCategory::Example => {
                "The Dutch Delta is an example how to deal with climate change in low-lying delta countries and the Dutch water sector remains a frontrunner"
            }
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            ImpactCategory::SocioEconomicAndEnvironment => {
                "The storm surge barriers contribute to satisfying the socio-economic and environmental needs in the hinterland. This implies that people, knowledge, data, and tools are available to determine what the hinterland requires from the storm surge barrier. These requirements will likely evolve over time due to changes in sea-level as well as changes in society."
            }
            ImpactCategory::ReliableBarriers => {
                "The storm surge barrier is reliable and in a good technical condition. The barrier is properly monitored and methods are available to determine the technical condition. Methods like an adaptive maintenance planning and people are available for timely decisions on maintenance and reinforcement of (parts of) the storm surge barrier in relation to the needs from the hinterland."
            }
            ImpactCategory::MaintenanceDecisions => {
                "A well-balanced maintenance is enabled and end-of-lifetime decision for the storm surge barriers can be made by including the system, technical and economical perspective. A time-based adaptive pathway is available to determine when a storm surge barrier reaches its end of life (functional and structural) and what the options and impacts are for maintenance, removal, replacement, closure. Supporting near-future decision making and avoiding maladaptation."
            }
            ImpactCategory::HumanCapital => {
                "Human capital for a safe and liveable delta. There is a knowledgeable community of professionals that is enabled to cope with the challenges in deltas."
            }
            ImpactCategory::Example => {
                "The Dutch Delta is an example how to deal with climate change in low-lying delta-countries and the Dutch Water sector remains a frontrunner. Knowledge and experience are shared in an inclusive international community with organizations and countries facing similar climate challenges."
            }
        }
    }

    /// Match a workbook cell against the category titles (case and surrounding
    /// whitespace are ignored).
    pub fn from_title(title: &str) -> Option<Self> {
        let title = title.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.title().eq_ignore_ascii_case(title))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StormSurgeBarrier {
    All,
    MaeslantBarrier,
    HartelBarrier,
    Ramspol,
    HollandseIJsselBarrier,
    EasternScheldtBarrier,
    HaringvlietBarrier,
}

impl StormSurgeBarrier {
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim() {
            "6SVK" | "6SSB" => Some(StormSurgeBarrier::All),
            "MLK" | "MLB" => Some(StormSurgeBarrier::MaeslantBarrier),
            "HK" => Some(StormSurgeBarrier::HartelBarrier),
            "RP" => Some(StormSurgeBarrier::Ramspol),
            "HIJK" => Some(StormSurgeBarrier::HollandseIJsselBarrier),
            "OSK" | "ESB" => Some(StormSurgeBarrier::EasternScheldtBarrier),
            "HV" => Some(StormSurgeBarrier::HaringvlietBarrier),
            _ => None,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            StormSurgeBarrier::All => "6SVK",
            StormSurgeBarrier::MaeslantBarrier => "MLK",
            StormSurgeBarrier::HartelBarrier => "HK",
            StormSurgeBarrier::Ramspol => "RP",
            StormSurgeBarrier::HollandseIJsselBarrier => "HIJK",
            StormSurgeBarrier::EasternScheldtBarrier => "OSK",
            StormSurgeBarrier::HaringvlietBarrier => "HV",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Priorities {
    pub water_safety: Priority,
    pub other_functions: Priority,
    pub maintenance: Priority,
    pub operation: Priority,
}

impl Priorities {
    pub fn axes(&self) -> [Priority; 4] {
        [self.water_safety, self.other_functions, self.maintenance, self.operation]
    }

    /// A record is high priority when any axis is `High` or the four ordinals sum above 8.
    pub fn is_high(&self) -> bool {
        let axes = self.axes();
        axes.contains(&Priority::High) || axes.iter().map(|p| u32::from(p.ordinal())).sum::<u32>() > 8
    }
}

/// One validated research question as produced by the record source.
#[derive(Clone, Debug, PartialEq)]
pub struct ResearchRecord {
    pub id: String,
    pub question: String,
    pub explanation: Option<String>,
    pub priorities: Priorities,
    pub time_frame: TimeFrame,
    pub primary_line: Option<ResearchLine>,
    pub secondary_line: Option<ResearchLine>,
    pub references: Vec<String>,
    pub barriers: Vec<StormSurgeBarrier>,
    pub impact_category: Option<ImpactCategory>,
    pub action_holder: Option<String>,
    pub cost_estimate: Option<f64>,
    pub lead_time: Option<f64>,
}

impl ResearchRecord {
    pub fn new(
        id: impl Into<String>,
        question: impl Into<String>,
        time_frame: TimeFrame,
        primary_line: Option<ResearchLine>,
    ) -> Self {
        Self {
            id: id.into(),
            question: question.into(),
            explanation: None,
            priorities: Priorities::default(),
            time_frame,
            primary_line,
            secondary_line: None,
            references: Vec::new(),
            barriers: vec![StormSurgeBarrier::All],
            impact_category: None,
            action_holder: None,
            cost_estimate: None,
            lead_time: None,
        }
    }

    pub fn has_priority(&self) -> bool {
        self.priorities.is_high()
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.id.trim().is_empty() {
            return Err("record id is empty".into());
        }
        if self.time_frame.requires_research_line() && self.primary_line.is_none() {
            return Err(format!(
                "record {} has time frame {:?} but no primary research line",
                self.id, self.time_frame
            ));
        }
        Ok(())
    }

    /// True when the record is relevant for `barrier` (records tagged `All` apply everywhere).
    pub fn applies_to(&self, barrier: StormSurgeBarrier) -> bool {
        barrier == StormSurgeBarrier::All
            || self
                .barriers
                .iter()
                .any(|b| *b == barrier || *b == StormSurgeBarrier::All)
    }
}

/// A row that was skipped while reading records.
#[derive(Clone, Debug, PartialEq)]
pub struct RowError {
    /// Zero-based sheet row.
    pub row: usize,
    /// Zero-based sheet column, when the problem is tied to a single cell.
    pub column: Option<usize>,
    pub message: String,
}

impl RowError {
    /// Excel-style reference of the offending cell ("B7"), or just the row number.
    pub fn cell_reference(&self) -> String {
        let mut reference = self.column.map(column_letters).unwrap_or_default();
        reference.push_str(&(self.row + 1).to_string());
        reference
    }
}

impl fmt::Display for RowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.cell_reference(), self.message)
    }
}

pub(crate) fn column_letters(mut index: usize) -> String {
    let mut letters = Vec::new();
    loop {
        letters.push(b'A' + (index % 26) as u8);
        if index < 26 {
            break;
        }
        index = index / 26 - 1;
    }
    letters.reverse();
    String::from_utf8_lossy(&letters).into_owned()
}

/// Records read from a source plus the rows that were rejected.
#[derive(Clone, Debug, Default)]
pub struct RecordSet {
    pub records: Vec<ResearchRecord>,
    pub errors: Vec<RowError>,
}
