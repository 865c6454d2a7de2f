//! Process-wide vertex and link style tables.
//!
//! The tables are keyed by style name and built once on first access. They
//! are never mutated at runtime. [`Palette::load`] resolves every color the
//! graph needs up front, so a malformed table entry fails at startup instead
//! of in the middle of an event.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use dagviz_types::ParentRefType;

use crate::color::{Rgba, parse_color};
use crate::error::GraphError;

/// Vertex style names.
pub mod vertex {
    /// Unconfirmed data message.
    pub const MESSAGE_PENDING: &str = "messagePending";
    /// Confirmed data message.
    pub const MESSAGE_CONFIRMED: &str = "messageConfirmed";
    /// Unconfirmed transaction.
    pub const TRANSACTION_PENDING: &str = "transactionPending";
    /// Confirmed transaction.
    pub const TRANSACTION_CONFIRMED: &str = "transactionConfirmed";
    /// Tip of the tangle.
    pub const TIP: &str = "tip";
    /// Vertex whose record is not known.
    pub const UNKNOWN: &str = "unknown";
    /// The currently selected vertex.
    pub const SELECTED: &str = "selected";
    /// Base size for every vertex.
    pub const DEFAULT: &str = "default";
}

/// Link style names.
pub mod link {
    /// Weak parent reference.
    pub const WEAK: &str = "weakLink";
    /// Strong parent reference.
    pub const STRONG: &str = "strongLink";
    /// Like parent reference.
    pub const LIKED: &str = "likedLink";
    /// Link inside the past cone of the selection.
    pub const PAST_CONE: &str = "pastConeLink";
    /// Link inside the future cone of the selection.
    pub const FUTURE_CONE: &str = "futureConeLink";
}

/// Visual attributes of a vertex style. Absent fields inherit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VertexStyle {
    /// Hex color.
    pub color: Option<&'static str>,
    /// Square side in pixels.
    pub size: Option<u32>,
}

/// Visual attributes of a link style. Absent fields inherit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LinkStyle {
    /// Hex color.
    pub color: Option<&'static str>,
    /// Line width in pixels.
    pub width: Option<u32>,
    /// Dash pattern name understood by the renderer.
    pub line_type: Option<&'static str>,
}

const fn colored(color: &'static str) -> VertexStyle {
    VertexStyle {
        color: Some(color),
        size: None,
    }
}

const fn line(color: &'static str) -> LinkStyle {
    LinkStyle {
        color: Some(color),
        width: None,
        line_type: None,
    }
}

static VERTEX_STYLES: LazyLock<BTreeMap<&'static str, VertexStyle>> = LazyLock::new(|| {
    BTreeMap::from([
        (vertex::MESSAGE_PENDING, colored("#b9b7bd")),
        (vertex::MESSAGE_CONFIRMED, colored("#6c71c4")),
        (vertex::TRANSACTION_PENDING, colored("#393e46")),
        (vertex::TRANSACTION_CONFIRMED, colored("#fad02c")),
        (vertex::TIP, colored("#cb4b16")),
        (vertex::UNKNOWN, colored("#b58900")),
        (
            vertex::SELECTED,
            VertexStyle {
                color: Some("#859900"),
                size: Some(30),
            },
        ),
        (
            vertex::DEFAULT,
            VertexStyle {
                color: None,
                size: Some(20),
            },
        ),
    ])
});

static LINK_STYLES: LazyLock<BTreeMap<&'static str, LinkStyle>> = LazyLock::new(|| {
    BTreeMap::from([
        (link::WEAK, line("#586e75")),
        (link::STRONG, line("#371A51")),
        (link::LIKED, line("#3b6f3b")),
        (link::PAST_CONE, line("#b58900")),
        (link::FUTURE_CONE, line("#d33682")),
    ])
});

/// Look up a vertex style by name.
pub fn vertex_style(name: &str) -> Option<VertexStyle> {
    VERTEX_STYLES.get(name).copied()
}

/// Look up a link style by name.
pub fn link_style(name: &str) -> Option<LinkStyle> {
    LINK_STYLES.get(name).copied()
}

/// Names of all vertex styles, sorted.
pub fn vertex_style_names() -> impl Iterator<Item = &'static str> {
    VERTEX_STYLES.keys().copied()
}

/// Names of all link styles, sorted.
pub fn link_style_names() -> impl Iterator<Item = &'static str> {
    LINK_STYLES.keys().copied()
}

/// Style name used for the structural link of a reference kind.
pub const fn link_style_name(kind: ParentRefType) -> &'static str {
    match kind {
        ParentRefType::Strong => link::STRONG,
        ParentRefType::Weak => link::WEAK,
        ParentRefType::Liked => link::LIKED,
    }
}

/// Resolve the color of a named vertex style.
///
/// Styles that define no color resolve to [`Rgba::FALLBACK`].
pub fn vertex_color(name: &'static str) -> Result<Rgba, GraphError> {
    let style = vertex_style(name).ok_or_else(|| GraphError::UnknownVertexStyle(name.to_owned()))?;
    parse_color(style.color.unwrap_or_default())
        .map_err(|source| GraphError::Color { style: name, source })
}

/// Resolve the color of a named link style.
pub fn link_color(name: &'static str) -> Result<Rgba, GraphError> {
    let style = link_style(name).ok_or_else(|| GraphError::UnknownLinkStyle(name.to_owned()))?;
    parse_color(style.color.unwrap_or_default())
        .map_err(|source| GraphError::Color { style: name, source })
}

fn vertex_size(name: &'static str) -> Result<u32, GraphError> {
    vertex_style(name)
        .map(|style| style.size.unwrap_or(DEFAULT_VERTEX_SIZE))
        .ok_or_else(|| GraphError::UnknownVertexStyle(name.to_owned()))
}

/// Vertex size used when the `default` style carries none.
const DEFAULT_VERTEX_SIZE: u32 = 20;

// ---------------------------------------------------------------------------
// Palette
// ---------------------------------------------------------------------------

/// Every color and size the graph applies, resolved from the style tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    /// `messagePending` color.
    pub message_pending: Rgba,
    /// `messageConfirmed` color.
    pub message_confirmed: Rgba,
    /// `transactionPending` color.
    pub transaction_pending: Rgba,
    /// `transactionConfirmed` color.
    pub transaction_confirmed: Rgba,
    /// `tip` color.
    pub tip: Rgba,
    /// `unknown` color.
    pub unknown: Rgba,
    /// `selected` color.
    pub selected: Rgba,
    /// `selected` size.
    pub selected_size: u32,
    /// `default` size.
    pub default_size: u32,
    /// `strongLink` color.
    pub strong_link: Rgba,
    /// `weakLink` color.
    pub weak_link: Rgba,
    /// `likedLink` color.
    pub liked_link: Rgba,
    /// `pastConeLink` color.
    pub past_cone_link: Rgba,
    /// `futureConeLink` color.
    pub future_cone_link: Rgba,
}

impl Palette {
    /// Resolve the palette from the global style tables.
    pub fn load() -> Result<Self, GraphError> {
        Ok(Self {
            message_pending: vertex_color(vertex::MESSAGE_PENDING)?,
            message_confirmed: vertex_color(vertex::MESSAGE_CONFIRMED)?,
            transaction_pending: vertex_color(vertex::TRANSACTION_PENDING)?,
            transaction_confirmed: vertex_color(vertex::TRANSACTION_CONFIRMED)?,
            tip: vertex_color(vertex::TIP)?,
            unknown: vertex_color(vertex::UNKNOWN)?,
            selected: vertex_color(vertex::SELECTED)?,
            selected_size: vertex_size(vertex::SELECTED)?,
            default_size: vertex_size(vertex::DEFAULT)?,
            strong_link: link_color(link::STRONG)?,
            weak_link: link_color(link::WEAK)?,
            liked_link: link_color(link::LIKED)?,
            past_cone_link: link_color(link::PAST_CONE)?,
            future_cone_link: link_color(link::FUTURE_CONE)?,
        })
    }

    /// Structural color of a link with the given reference kind.
    pub const fn link_color(&self, kind: ParentRefType) -> Rgba {
        match kind {
            ParentRefType::Strong => self.strong_link,
            ParentRefType::Weak => self.weak_link,
            ParentRefType::Liked => self.liked_link,
        }
    }
}

impl Default for Palette {
    /// A palette where every color is [`Rgba::FALLBACK`].
    ///
    /// Only useful when the style tables cannot be loaded; production code
    /// goes through [`Palette::load`].
    fn default() -> Self {
        Self {
            message_pending: Rgba::FALLBACK,
            message_confirmed: Rgba::FALLBACK,
            transaction_pending: Rgba::FALLBACK,
            transaction_confirmed: Rgba::FALLBACK,
            tip: Rgba::FALLBACK,
            unknown: Rgba::FALLBACK,
            selected: Rgba::FALLBACK,
            selected_size: DEFAULT_VERTEX_SIZE,
            default_size: DEFAULT_VERTEX_SIZE,
            strong_link: Rgba::FALLBACK,
            weak_link: Rgba::FALLBACK,
            liked_link: Rgba::FALLBACK,
            past_cone_link: Rgba::FALLBACK,
            future_cone_link: Rgba::FALLBACK,
        }
    }
}
