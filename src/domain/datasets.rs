//! Portfolio datasets drawn by the views.

use itertools::Itertools;
use serde::Serialize;

use crate::domain::error::DomainError;
use crate::domain::geo::LonLat;
use crate::domain::hierarchy::NodeSpec;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Proficiency {
    pub software: &'static str,
    /// Percent, 0..=100
    pub score: f64,
}

#[rustfmt::skip]
pub const SOFTWARE_PROFICIENCY: [Proficiency; 5] = [
    Proficiency { software: "UE5", score: 85.0 },
    Proficiency { software: "Unity", score: 75.0 },
    Proficiency { software: "Blender", score: 90.0 },
    Proficiency { software: "Spyder", score: 60.0 },
    Proficiency { software: "Figma", score: 80.0 },
];

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CreativeWork {
    pub year: i32,
    pub kind: &'static str,
    pub count: u32,
}

#[rustfmt::skip]
pub const CREATIVE_WORKS: [CreativeWork; 7] = [
    CreativeWork { year: 2023, kind: "Painting", count: 4 },
    CreativeWork { year: 2023, kind: "Video Art", count: 2 },
    CreativeWork { year: 2024, kind: "VR", count: 5 },
    CreativeWork { year: 2024, kind: "Installation", count: 2 },
    CreativeWork { year: 2025, kind: "Performance", count: 3 },
    CreativeWork { year: 2025, kind: "VR", count: 4 },
    CreativeWork { year: 2026, kind: "AI Art", count: 2 },
];

/// SF-36 component summary scores at one follow-up visit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HealthScore {
    pub month: u32,
    pub physical: f64,
    pub mental: f64,
}

impl HealthScore {
    pub fn component(&self, component: &str) -> Option<f64> {
        match component {
            "Physical" => Some(self.physical),
            "Mental" => Some(self.mental),
            _ => None,
        }
    }
}

/// First record is the month 0 baseline.
#[rustfmt::skip]
pub const HEALTH_SCORES: [HealthScore; 9] = [
    HealthScore { month: 0, physical: 46.7, mental: 36.8 },
    HealthScore { month: 3, physical: 47.9, mental: 36.9 },
    HealthScore { month: 6, physical: 48.1, mental: 38.4 },
    HealthScore { month: 9, physical: 47.6, mental: 39.6 },
    HealthScore { month: 12, physical: 47.7, mental: 41.1 },
    HealthScore { month: 15, physical: 47.0, mental: 40.3 },
    HealthScore { month: 18, physical: 47.1, mental: 39.6 },
    HealthScore { month: 21, physical: 48.0, mental: 40.1 },
    HealthScore { month: 24, physical: 46.9, mental: 41.2 },
];

pub const HEALTH_COMPONENTS: [&str; 2] = ["Physical", "Mental"];

/// General population mean of an SF-36 component score.
pub const POPULATION_NORM: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Skill {
    pub name: &'static str,
    /// Proficiency boxes filled, 0..=5
    pub level: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SkillCategory {
    pub name: &'static str,
    pub skills: &'static [Skill],
}

const fn skill(name: &'static str, level: u8) -> Skill {
    Skill { name, level }
}

pub const SKILL_CATEGORIES: [SkillCategory; 4] = [
    SkillCategory {
        name: "Software",
        skills: &[
            skill("Unity", 4),
            skill("UE5", 3),
            skill("Blender", 2),
            skill("Substance", 2),
            skill("P5.js", 5),
            skill("Figma", 5),
        ],
    },
    SkillCategory {
        name: "Machine Learning",
        skills: &[skill("PyTorch", 3), skill("TensorFlow", 2), skill("Scikit-learn", 2)],
    },
    SkillCategory {
        name: "Code",
        skills: &[
            skill("C#", 3),
            skill("C++", 2),
            skill("HTML/CSS", 3),
            skill("Java", 4),
            skill("Python", 3),
        ],
    },
    SkillCategory {
        name: "Languages",
        skills: &[
            skill("English", 5),
            skill("Mandarin", 5),
            skill("Cantonese", 3),
            skill("German", 2),
        ],
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Honor {
    pub year: i32,
    pub kind: &'static str,
    pub title: &'static str,
    pub description: &'static str,
}

#[rustfmt::skip]
const HONORS: [Honor; 14] = [
    Honor { year: 2022, kind: "Academic", title: "Top Entrance Scholarship", description: "CityU Top Entrance Scholarship for International Students, 2022-2026." },
    Honor { year: 2022, kind: "Academic", title: "Dean's List", description: "Dean's List, 2022." },
    Honor { year: 2023, kind: "Academic", title: "Overseas Experience Awards", description: "Dr. Peter Chung Yin Lee Memorial Fund Overseas Experience Awards, 2023." },
    Honor { year: 2024, kind: "Academic", title: "CityU Scholarship", description: "CityU Scholarship, 2024." },
    Honor { year: 2022, kind: "Academic", title: "Talent Development Scholarship (HKSAR)", description: "HKSAR Government Scholarship Fund (Non-academic Awards) - Talent Development 2022-2025." },
    Honor { year: 2025, kind: "Academic", title: "Reaching Out Award (HKSAR)", description: "HKSAR Government Scholarship Fund - Reaching Out Award 2025." },
    Honor { year: 2025, kind: "Creative", title: "Jewellery Exhibition (Beijing)", description: "Artwork exhibited in Beijing International Jewellery Exhibition 2025." },
    Honor { year: 2024, kind: "Creative", title: "Film Festival (Lugano)", description: "Animation project screening at Lugano Animation Days in Switzerland, 2024." },
    Honor { year: 2024, kind: "Creative", title: "Film Festival (Cinémathèque québécoise)", description: "Animation project screening at the Cinémathèque québécoise in Montreal, Canada 2024." },
    Honor { year: 2024, kind: "Creative", title: "Experimental Film Festival", description: "Animation project screening at International Experimental Film Festival, 2024." },
    Honor { year: 2018, kind: "Sports", title: "National First-class Golf Athlete", description: "National First-class Golf Athlete, 2018." },
    Honor { year: 2023, kind: "Sports", title: "Bronze (Tennis)", description: "Bronze of USFHK Women Tennis competition, 2023." },
    Honor { year: 2024, kind: "Sports", title: "First Place (Tennis)", description: "First place of USFHK Women Tennis competition, 2024." },
    Honor { year: 2024, kind: "Sports", title: "Sports Awards (Dr. Herman Hu)", description: "Dr. Herman Hu Sports Awards and Scholarships, 2024." },
];

/// Honors ordered by year; ties keep their listed order.
pub fn honors() -> Vec<Honor> {
    HONORS.iter().copied().sorted_by_key(|h| h.year).collect()
}

/// Honor categories, bottom to top on the scrolly timeline.
pub const HONOR_KINDS: [&str; 3] = ["Sports", "Creative", "Academic"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Milestone {
    pub year: i32,
    pub name: &'static str,
    pub kind: &'static str,
}

#[rustfmt::skip]
pub const MILESTONES: [Milestone; 12] = [
    Milestone { year: 2022, name: "CityU Top Entrance Scholarship", kind: "Scholarship" },
    Milestone { year: 2022, name: "HKSAR Talent Development", kind: "Scholarship" },
    Milestone { year: 2022, name: "Dean’s List", kind: "Scholarship" },
    Milestone { year: 2023, name: "Dr. Peter Chung Yin Lee Fund", kind: "Scholarship" },
    Milestone { year: 2023, name: "USFHK Women Tennis Bronze", kind: "Sports" },
    Milestone { year: 2024, name: "CityU Scholarship", kind: "Scholarship" },
    Milestone { year: 2024, name: "Animation Screening – Experimental Film", kind: "Exhibition" },
    Milestone { year: 2024, name: "Animation Screening – Montreal", kind: "Exhibition" },
    Milestone { year: 2024, name: "Animation Screening – Lugano", kind: "Exhibition" },
    Milestone { year: 2024, name: "Dr. Herman Hu Sports Awards", kind: "Sports" },
    Milestone { year: 2024, name: "USFHK Women Tennis 1st Place", kind: "Sports" },
    Milestone { year: 2025, name: "Beijing Int'l Jewellery Exhibition", kind: "Exhibition" },
];

pub const MILESTONE_KINDS: [&str; 3] = ["Scholarship", "Exhibition", "Sports"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Project {
    pub id: &'static str,
    pub year: &'static str,
    pub tech: &'static str,
    pub description: &'static str,
    pub image: &'static str,
}

pub const PROJECTS: [Project; 4] = [
    Project {
        id: "Feminine Animation",
        year: "2024.06",
        tech: "Unity, Nomad, Procreate, AfterEffect",
        description: "An experimental animation blending 2D hand drawings and 3D abstraction. Screened internationally at Cinémathèque Québécoise and Lugano Animation Days.",
        image: "fem.JPG",
    },
    Project {
        id: "Buddha Heritage Restoration",
        year: "2024.01",
        tech: "Python, PyTorch, NumPy, Scikit-learn",
        description: "A machine-learning-based restoration of Buddhist sculptures using KNN for reconstructing incomplete statues, combining technology and cultural preservation.",
        image: "Buddha.JPG",
    },
    Project {
        id: "Integrative Sculpture",
        year: "2024.12",
        tech: "Blender, Arduino, 3D Printing",
        description: "An interactive sculpture using Arduino sensors and air pumps, exploring fertilization through kinetic and sculptural abstraction.",
        image: "sculpture.JPG",
    },
    Project {
        id: "Generative Calligraphy",
        year: "2023.08",
        tech: "P5.js, ML in Object Detection",
        description: "Interactive calligraphy artwork interpreting user gestures via ML classification, merging traditional brush aesthetics with generative computation.",
        image: "calligraphy.JPG",
    },
];

/// `(source, target)` project ids.
pub const PROJECT_LINKS: [(&str, &str); 3] = [
    ("Generative Calligraphy", "Feminine Animation"),
    ("Feminine Animation", "Buddha Heritage Restoration"),
    ("Buddha Heritage Restoration", "Integrative Sculpture"),
];

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Place {
    pub name: &'static str,
    pub coords: LonLat,
}

const fn place(name: &'static str, lon: f64, lat: f64) -> Place {
    Place {
        name,
        coords: [lon, lat],
    }
}

pub const VISITED_PLACES: [Place; 13] = [
    place("Shanghai", 121.4737, 31.2304),
    place("Xiamen", 118.0894, 24.4798),
    place("Xinjiang", 87.6177, 43.7928),
    place("Xizang", 91.1172, 29.6469),
    place("Shenzhen", 114.0579, 22.5431),
    place("Sanya", 109.5121, 18.2528),
    place("Paris", 2.3522, 48.8566),
    place("Milano", 9.19, 45.4642),
    place("Luzern", 8.3059, 47.0502),
    place("Lugano", 8.9511, 46.0037),
    place("Barcelona", 2.1734, 41.3851),
    place("Malaga", -4.4214, 36.7213),
    place("Greece", 23.7275, 37.9838),
];

pub const STUDIED_PLACES: [Place; 5] = [
    place("Dalian", 121.6147, 38.914),
    place("Hong Kong", 114.1694, 22.3193),
    place("London", -0.1276, 51.5072),
    place("Zurich", 8.5417, 47.3769),
    place("Seoul", 126.978, 37.5665),
];

fn project(name: &str, groups: &[(&str, &[&str])]) -> NodeSpec {
    NodeSpec::branch(
        name,
        groups
            .iter()
            .map(|(group, leaves)| {
                NodeSpec::branch(*group, leaves.iter().map(|l| NodeSpec::leaf(*l)).collect())
            })
            .collect(),
    )
}

/// The "Academic & Projects" tree: project, then Tools/Skills/Context, then items.
pub fn portfolio_tree() -> NodeSpec {
    NodeSpec::branch(
        "Academic & Projects",
        vec![
            project(
                "Eye Tracking PDF Reader",
                &[
                    ("Tools", &["Python (NLP)", "Tobii SDK", "PyQt"]),
                    ("Skills", &["Gaze Interaction", "Cognitive Load Analysis"]),
                    ("Context", &["Accessibility Design"]),
                ],
            ),
            project(
                "VR Motion Trace",
                &[
                    ("Tools", &["Unity 3D", "Meta Quest SDK", "C#"]),
                    ("Skills", &["Spatial Mapping", "Immersive Analytics"]),
                    ("Context", &["Digital Performance"]),
                ],
            ),
            project(
                "Feminine Animation",
                &[
                    ("Tools", &["Unity", "Nomad Sculpt", "AfterEffects"]),
                    ("Skills", &["Visual Metaphor", "2D-3D Hybrid"]),
                ],
            ),
            project(
                "Buddha Restoration",
                &[
                    ("Tools", &["PyTorch", "KNN Algorithms", "NumPy"]),
                    ("Context", &["Cultural Heritage", "AI Reconstruction"]),
                ],
            ),
            project(
                "Generative Calligraphy",
                &[
                    ("Tools", &["P5.js", "ML5.js (Object Detect)"]),
                    ("Skills", &["Gesture Interaction", "Generative Art"]),
                ],
            ),
            project(
                "Integrative Sculpture",
                &[
                    ("Tools", &["Arduino", "Blender (3D Print)", "Pneumatics"]),
                    ("Context", &["Physical Computing"]),
                ],
            ),
        ],
    )
}

/// Reject records outside their documented ranges.
pub fn validate() -> Result<(), DomainError> {
    let invalid = |name: &str, message: String| DomainError::InvalidDataset {
        name: name.to_string(),
        message,
    };
    if let Some(p) = SOFTWARE_PROFICIENCY
        .iter()
        .find(|p| !(0.0..=100.0).contains(&p.score))
    {
        return Err(invalid("proficiency", format!("{} scored {}", p.software, p.score)));
    }
    if let Some(s) = SKILL_CATEGORIES
        .iter()
        .flat_map(|c| c.skills.iter())
        .find(|s| s.level > 5)
    {
        return Err(invalid("skills", format!("{} has level {}", s.name, s.level)));
    }
    if HEALTH_SCORES.first().map(|s| s.month) != Some(0) {
        return Err(invalid("health scores", "missing month 0 baseline".into()));
    }
    if let Some(h) = HONORS.iter().find(|h| !HONOR_KINDS.contains(&h.kind)) {
        return Err(invalid("honors", format!("unknown kind {}", h.kind)));
    }
    let ids: Vec<&str> = PROJECTS.iter().map(|p| p.id).collect();
    if let Some((s, t)) = PROJECT_LINKS
        .iter()
        .find(|(s, t)| !ids.contains(s) || !ids.contains(t))
    {
        return Err(invalid("projects", format!("dangling link {s} -> {t}")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::hierarchy::Hierarchy;

    #[test]
    fn test_builtin_datasets_are_valid() {
        validate().unwrap();
    }

    #[test]
    fn test_honors_are_sorted_by_year() {
        let years: Vec<i32> = honors().iter().map(|h| h.year).collect();
        assert_eq!(years.first(), Some(&2018));
        assert!(years.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_portfolio_tree_shape() {
        let h = Hierarchy::from_spec(&portfolio_tree());
        assert_eq!(h.children(h.root()).unwrap().len(), 6);
        assert_eq!(h.depth(), 4);
        assert!(h.leaf_labels().contains(&"Tobii SDK".to_string()));
    }
}
