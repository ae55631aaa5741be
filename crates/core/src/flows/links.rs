use serde::{Deserialize, Serialize};

/// One outgoing edge of a step. A link without a condition is taken
/// unconditionally (or as the `else` branch when it follows conditional ones).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FlowLink {
    pub condition: Option<String>,
    pub target: String,
}

impl FlowLink {
    pub fn to_step(target: impl Into<String>) -> Self {
        Self { condition: None, target: target.into() }
    }

    pub fn when(condition: impl Into<String>, target: impl Into<String>) -> Self {
        Self { condition: Some(condition.into()), target: target.into() }
    }
}

/// Ordered links of a step. Serialized as a bare step id for a single
/// unconditional link, otherwise as a list of `{if, then}` / `{else}` records.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawFlowLinks", into = "RawFlowLinks")]
pub struct FlowLinks {
    pub links: Vec<FlowLink>,
}

impl FlowLinks {
    pub fn new(links: Vec<FlowLink>) -> Self {
        Self { links }
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn targets(&self) -> impl Iterator<Item = &str> {
        self.links.iter().map(|link| link.target.as_str())
    }
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum RawFlowLinks {
    Static(String),
    Branches(Vec<RawFlowLink>),
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum RawFlowLink {
    If {
        #[serde(rename = "if")]
        condition: String,
        then: String,
    },
    Else {
        #[serde(rename = "else")]
        target: String,
    },
}

impl From<RawFlowLinks> for FlowLinks {
    fn from(raw: RawFlowLinks) -> Self {
        match raw {
            RawFlowLinks::Static(target) => Self::new(vec![FlowLink::to_step(target)]),
            RawFlowLinks::Branches(branches) => Self::new(
                branches
                    .into_iter()
                    .map(|branch| match branch {
                        RawFlowLink::If { condition, then } => FlowLink::when(condition, then),
                        RawFlowLink::Else { target } => FlowLink::to_step(target),
                    })
                    .collect(),
            ),
        }
    }
}

impl From<FlowLinks> for RawFlowLinks {
    fn from(links: FlowLinks) -> Self {
        match links.links.as_slice() {
            [FlowLink { condition: None, target }] => Self::Static(target.clone()),
            _ => Self::Branches(
                links
                    .links
                    .into_iter()
                    .map(|link| match link.condition {
                        Some(condition) => RawFlowLink::If { condition, then: link.target },
                        None => RawFlowLink::Else { target: link.target },
                    })
                    .collect(),
            ),
        }
    }
}
