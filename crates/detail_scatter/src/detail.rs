//! Detail definitions: the document-side hierarchy that drives scattering.
//!
//! A [`DetailSet`] holds [`Detail`] rule sets. Each detail has a density and an ordered
//! list of [`DetailGroup`]s blended along an alpha axis; each group holds [`DetailProp`]s
//! chosen by cumulative `amount` thresholds. A prop's [`PropKind`] decides what gets
//! rendered: a flat sprite, a three-quad shape, or an external model.
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Ordered collection of details, one of which is active for preview.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DetailSet {
    pub details: Vec<Detail>,
    pub active: Option<usize>,
}

impl DetailSet {
    pub fn new(details: Vec<Detail>) -> Self {
        Self {
            details,
            active: None,
        }
    }

    /// Returns the active detail, if the active index is set and in range.
    pub fn active(&self) -> Option<&Detail> {
        self.active.and_then(|i| self.details.get(i))
    }

    /// Selects the active detail. Out-of-range indices clear the selection.
    pub fn set_active(&mut self, index: Option<usize>) {
        self.active = index.filter(|&i| i < self.details.len());
    }
}

/// A scattering rule set tied to one ground material.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct Detail {
    /// Detail type name as referenced by ground materials.
    pub detail_type: String,
    /// Expected instances per square world unit, before the density scale is applied.
    pub density: f32,
    pub groups: Vec<DetailGroup>,
}

impl Detail {
    pub fn new(detail_type: impl Into<String>, density: f32) -> Self {
        Self {
            detail_type: detail_type.into(),
            density,
            groups: Vec::new(),
        }
    }

    pub fn with_group(mut self, group: DetailGroup) -> Self {
        self.groups.push(group);
        self
    }

    /// Looks up the prop addressed by `prop_ref`.
    pub fn prop(&self, prop_ref: PropRef) -> Option<&DetailProp> {
        self.groups
            .get(prop_ref.group)
            .and_then(|g| g.props.get(prop_ref.prop))
    }

    /// Iterates all props in traversal order together with their references.
    pub fn props(&self) -> impl Iterator<Item = (PropRef, &DetailProp)> {
        self.groups.iter().enumerate().flat_map(|(gi, group)| {
            group
                .props
                .iter()
                .enumerate()
                .map(move |(pi, prop)| (PropRef::new(gi, pi), prop))
        })
    }
}

/// A sub-bucket of a [`Detail`], selected by its alpha threshold.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct DetailGroup {
    pub name: String,
    pub alpha: f32,
    pub props: Vec<DetailProp>,
}

impl DetailGroup {
    pub fn new(name: impl Into<String>, alpha: f32) -> Self {
        Self {
            name: name.into(),
            alpha,
            props: Vec::new(),
        }
    }

    pub fn with_prop(mut self, prop: DetailProp) -> Self {
        self.props.push(prop);
        self
    }
}

/// Index pair addressing a prop inside a [`Detail`]. Ordered by traversal order.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PropRef {
    pub group: usize,
    pub prop: usize,
}

impl PropRef {
    pub const fn new(group: usize, prop: usize) -> Self {
        Self { group, prop }
    }
}

/// A single scatterable definition.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct DetailProp {
    pub name: String,
    /// Cumulative selection threshold within the owning group.
    pub amount: f32,
    /// Keep the placement's up axis vertical instead of following the surface normal.
    pub upright: bool,
    /// Minimum surface slope in degrees for a placement to be kept.
    pub min_angle: f32,
    /// Maximum surface slope in degrees for a placement to be kept.
    pub max_angle: f32,
    pub kind: PropKind,
}

impl DetailProp {
    pub fn new(name: impl Into<String>, amount: f32, kind: PropKind) -> Self {
        Self {
            name: name.into(),
            amount,
            upright: true,
            min_angle: 0.0,
            max_angle: 180.0,
            kind,
        }
    }

    pub fn sprite(name: impl Into<String>, amount: f32, sprite: SpriteProp) -> Self {
        Self::new(name, amount, PropKind::Sprite(sprite))
    }

    pub fn shape(
        name: impl Into<String>,
        amount: f32,
        sprite: SpriteProp,
        shape: ShapeParams,
    ) -> Self {
        Self::new(name, amount, PropKind::Shape(ShapeProp { sprite, shape }))
    }

    pub fn model(name: impl Into<String>, amount: f32, model: impl Into<String>) -> Self {
        Self::new(
            name,
            amount,
            PropKind::Model(ModelProp {
                model: model.into(),
            }),
        )
    }

    /// Tilt placements to the surface normal instead of keeping them vertical.
    pub fn with_upright(mut self, upright: bool) -> Self {
        self.upright = upright;
        self
    }

    /// Restrict placements to surfaces whose slope lies in `[min, max]` degrees.
    pub fn with_angle_range(mut self, min: f32, max: f32) -> Self {
        self.min_angle = min;
        self.max_angle = max;
        self
    }

    pub fn tag(&self) -> PropKindTag {
        self.kind.tag()
    }

    /// Sprite parameters shared by sprite and shape kinds.
    pub fn sprite_params(&self) -> Option<&SpriteProp> {
        match &self.kind {
            PropKind::Sprite(sprite) => Some(sprite),
            PropKind::Shape(shape) => Some(&shape.sprite),
            PropKind::Model(_) => None,
        }
    }

    pub fn random_scale(&self) -> Option<f32> {
        self.sprite_params().and_then(|s| s.random_scale)
    }

    /// Whether placements of this prop are rendered through instanced sprite batches.
    pub fn is_sprite_like(&self) -> bool {
        !matches!(self.kind, PropKind::Model(_))
    }

    /// Whether a surface with the given slope (degrees from world up) accepts this prop.
    pub fn accepts_slope(&self, slope_degrees: f32) -> bool {
        slope_degrees >= self.min_angle && slope_degrees <= self.max_angle
    }
}

/// Kind-specific payload of a [`DetailProp`].
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub enum PropKind {
    Sprite(SpriteProp),
    Shape(ShapeProp),
    Model(ModelProp),
}

impl PropKind {
    pub fn tag(&self) -> PropKindTag {
        match self {
            PropKind::Sprite(_) => PropKindTag::Sprite,
            PropKind::Shape(_) => PropKindTag::Shape,
            PropKind::Model(_) => PropKindTag::Model,
        }
    }
}

/// Numeric kind discriminant as exchanged with hosts (`0` sprite, `1` shape, `2` model).
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum PropKindTag {
    Sprite = 0,
    Shape = 1,
    Model = 2,
}

impl TryFrom<u32> for PropKindTag {
    type Error = Error;

    fn try_from(tag: u32) -> Result<Self> {
        match tag {
            0 => Ok(PropKindTag::Sprite),
            1 => Ok(PropKindTag::Shape),
            2 => Ok(PropKindTag::Model),
            _ => Err(Error::UnknownPropKind { tag }),
        }
    }
}

/// Billboarding mode applied every frame.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Orientation {
    /// Use the static facing angle drawn at placement time.
    #[default]
    None,
    /// Face the camera fully (spherical billboard).
    AllAxes,
    /// Rotate about world up to face the camera (cylindrical billboard).
    ZAxis,
}

/// Sprite parameters shared by sprite and shape props.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct SpriteProp {
    pub bound: SpriteBound,
    pub size: PivotRect,
    pub random_scale: Option<f32>,
    pub orientation: Orientation,
    pub sway: f32,
}

impl SpriteProp {
    pub fn new(bound: SpriteBound, size: PivotRect) -> Self {
        Self {
            bound,
            size,
            random_scale: None,
            orientation: Orientation::None,
            sway: 0.0,
        }
    }

    pub fn with_random_scale(mut self, random_scale: f32) -> Self {
        self.random_scale = Some(random_scale);
        self
    }

    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }

    pub fn with_sway(mut self, sway: f32) -> Self {
        self.sway = sway;
        self
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct ShapeProp {
    pub sprite: SpriteProp,
    pub shape: ShapeParams,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShapeParams {
    pub variant: ShapeVariant,
    /// Tilt of each quad about its local X axis, in degrees. `Tri` only.
    pub angle: f32,
    /// Offset of each quad along its local Z axis, as a fraction of the sprite width. `Tri` only.
    pub radius: f32,
}

impl ShapeParams {
    pub fn cross() -> Self {
        Self {
            variant: ShapeVariant::Cross,
            angle: 0.0,
            radius: 0.0,
        }
    }

    pub fn tri(angle: f32, radius: f32) -> Self {
        Self {
            variant: ShapeVariant::Tri,
            angle,
            radius,
        }
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ShapeVariant {
    Tri,
    #[default]
    Cross,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModelProp {
    pub model: String,
}

/// Texture-space crop of a sprite inside its atlas, in pixels.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SpriteBound {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    /// Width of the full source image; zero means "use the bound material's width".
    pub image_width: f32,
}

impl SpriteBound {
    pub fn new(x: f32, y: f32, w: f32, h: f32, image_width: f32) -> Self {
        Self {
            x,
            y,
            w,
            h,
            image_width,
        }
    }
}

/// Pivot fraction (`x`, `y` in `[0, 1]`) and world-unit size of a sprite quad.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PivotRect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl PivotRect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }
}

impl Default for PivotRect {
    fn default() -> Self {
        Self {
            x: 0.5,
            y: 0.5,
            w: 16.0,
            h: 16.0,
        }
    }
}
