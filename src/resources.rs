/// One entry in the Resources tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resource {
    pub category: &'static str,
    pub name: &'static str,
    pub url: &'static str,
    pub description: &'static str,
}

pub const DIRECTORY: &[Resource] = &[
    Resource {
        category: "prop-firms",
        name: "Topstep",
        url: "https://www.topstep.com",
        description: "Futures funded trader evaluations.",
    },
    Resource {
        category: "prop-firms",
        name: "Apex Trader Funding",
        url: "https://apextraderfunding.com",
        description: "Futures evaluations with trailing drawdown.",
    },
    Resource {
        category: "charting",
        name: "TradingView",
        url: "https://www.tradingview.com",
        description: "Charts, alerts and a shared idea stream.",
    },
    Resource {
        category: "journaling",
        name: "Tradervue",
        url: "https://www.tradervue.com",
        description: "Trade journal with execution imports.",
    },
    Resource {
        category: "journaling",
        name: "Edgewonk",
        url: "https://edgewonk.com",
        description: "Journal focused on tilt and rule tracking.",
    },
    Resource {
        category: "news",
        name: "Forex Factory Calendar",
        url: "https://www.forexfactory.com/calendar",
        description: "Economic calendar for high-impact events.",
    },
];

pub fn find(category: &str, name: &str) -> Option<&'static Resource> {
    DIRECTORY
        .iter()
        .find(|resource| resource.category == category && resource.name == name)
}

/// Categories in directory order, without repeats.
pub fn categories() -> Vec<&'static str> {
    let mut seen = Vec::new();
    for resource in DIRECTORY {
        if !seen.contains(&resource.category) {
            seen.push(resource.category);
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_requires_matching_category() {
        assert!(find("charting", "TradingView").is_some());
        assert!(find("journaling", "TradingView").is_none());
    }

    #[test]
    fn categories_keep_first_appearance_order() {
        assert_eq!(categories(), ["prop-firms", "charting", "journaling", "news"]);
    }
}
