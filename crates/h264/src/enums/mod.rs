mod aspect_ratio_idc;
mod nal_unit_type;

pub use self::aspect_ratio_idc::AspectRatioIdc;
pub use self::nal_unit_type::NALUnitType;
