mod nal_unit_type;

pub use self::nal_unit_type::NALUnitType;
