//! UVC class constants and the Video Control / Video Streaming short
//! forms.
//!
//! Codes are from the UVC specification appendix A; the class revision
//! emitted in `bcdUVC` (and the details that hang off it) is selected at
//! compile time by the `uvc11`/`uvc15` cargo features, defaulting to
//! UVC 1.0.

use crate::descriptor::Guid;

/// Video interface class code (A.1).
pub const CC_VIDEO: u8 = 0x0E;

// Video interface subclass codes (A.2).
pub const SC_VIDEOCONTROL: u8 = 0x01;
pub const SC_VIDEOSTREAMING: u8 = 0x02;
pub const SC_VIDEO_INTERFACE_COLLECTION: u8 = 0x03;

// Video interface protocol codes (A.3).
pub const PC_PROTOCOL_UNDEFINED: u8 = 0x00;
pub const PC_PROTOCOL_15: u8 = 0x01;

// Class-specific descriptor types (A.4).
pub const CS_INTERFACE: u8 = 0x24;
pub const CS_ENDPOINT: u8 = 0x25;

// VC interface descriptor subtypes (A.5).
pub const VC_HEADER: u8 = 0x01;
pub const VC_INPUT_TERMINAL: u8 = 0x02;
pub const VC_OUTPUT_TERMINAL: u8 = 0x03;
pub const VC_SELECTOR_UNIT: u8 = 0x04;
pub const VC_PROCESSING_UNIT: u8 = 0x05;
pub const VC_EXTENSION_UNIT: u8 = 0x06;

// VS interface descriptor subtypes (A.6).
pub const VS_INPUT_HEADER: u8 = 0x01;
pub const VS_OUTPUT_HEADER: u8 = 0x02;
pub const VS_FORMAT_UNCOMPRESSED: u8 = 0x04;
pub const VS_FRAME_UNCOMPRESSED: u8 = 0x05;
pub const VS_FORMAT_FRAME_BASED: u8 = 0x10;
pub const VS_FRAME_FRAME_BASED: u8 = 0x11;

// Endpoint descriptor subtypes (A.7).
pub const EP_INTERRUPT: u8 = 0x03;

/// Camera input terminal type (B.2).
pub const ITT_CAMERA: u16 = 0x0201;

/// USB streaming output terminal type (B.3).
pub const OTT_STREAMING: u16 = 0x0101;

/// The class revision this build emits, BCD-encoded.
pub const fn bcd_uvc() -> u16 {
    if cfg!(feature = "uvc15") {
        0x0150
    } else if cfg!(feature = "uvc11") {
        0x0110
    } else {
        0x0100
    }
}

/// Protocol byte for VC/VS interfaces under the selected revision.
pub(crate) const fn protocol_code() -> u8 {
    if cfg!(feature = "uvc15") {
        PC_PROTOCOL_15
    } else {
        PC_PROTOCOL_UNDEFINED
    }
}

/// Video Control interface short form; class, subclass and protocol are
/// filled in by the builder.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct VcInterface {
    pub b_interface_number: u8,
    pub b_alternate_setting: u8,
    pub b_num_endpoints: u8,
    pub i_interface: u8,
}

/// Video Streaming interface short form.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct VsInterface {
    pub b_interface_number: u8,
    pub b_alternate_setting: u8,
    pub b_num_endpoints: u8,
    pub i_interface: u8,
}

/// Camera (input) terminal short form. The terminal type is always
/// ITT_CAMERA; `bm_controls` supplies the 3-byte control bitmap in its
/// low bytes.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CameraTerminal {
    pub b_terminal_id: u8,
    pub b_assoc_terminal: u8,
    pub i_terminal: u8,
    pub w_objective_focal_length_min: u16,
    pub w_objective_focal_length_max: u16,
    pub w_ocular_focal_length: u16,
    pub bm_controls: u32,
}

impl CameraTerminal {
    pub const LEN: usize = 18;
}

/// Streaming (output) terminal short form. The terminal type is always
/// OTT_STREAMING.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StreamingOutTerminal {
    pub b_terminal_id: u8,
    pub b_assoc_terminal: u8,
    pub b_source_id: u8,
    pub i_terminal: u8,
}

impl StreamingOutTerminal {
    pub const LEN: usize = 9;
}

/// Processing unit short form. `bm_video_standards` is emitted only for
/// UVC 1.1 and above; the field is ignored otherwise.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ProcessingUnit {
    pub b_unit_id: u8,
    pub b_source_id: u8,
    pub w_max_multiplier: u16,
    pub bm_controls: u32,
    pub i_processing: u8,
    pub bm_video_standards: u8,
}

impl ProcessingUnit {
    pub const LEN: usize = if cfg!(any(feature = "uvc11", feature = "uvc15")) {
        13
    } else {
        12
    };
}

/// Extension unit short form. The source list is passed separately to
/// the maker; `bm_controls` is the vendor control bitmap, whose length
/// becomes `bControlSize` on the wire.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ExtensionUnit<'a> {
    pub b_unit_id: u8,
    pub guid_extension_code: Guid,
    pub b_num_controls: u8,
    pub bm_controls: &'a [u8],
    pub i_extension: u8,
}

impl ExtensionUnit<'_> {
    /// Fixed prefix before the variable segments: header, subtype, unit
    /// id, GUID, bNumControls, bNrInPins.
    pub const FIXED_LEN: usize = 22;
}

/// VS interface input header short form. `bNumFormats` is derived from
/// the per-format control list handed to the maker.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct VsInputHeader {
    pub b_endpoint_address: u8,
    pub bm_info: u8,
    pub b_terminal_link: u8,
    pub b_still_capture_method: u8,
    pub b_trigger_support: u8,
    pub b_trigger_usage: u8,
}

impl VsInputHeader {
    pub const FIXED_LEN: usize = 13;
}

/// VS interface output header short form; as for the input header, the
/// format count comes from the control list.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct VsOutputHeader {
    pub b_endpoint_address: u8,
    pub b_terminal_link: u8,
}

impl VsOutputHeader {
    pub const FIXED_LEN: usize = 9;
}

/// Uncompressed payload format short form.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FormatUncompressed {
    pub b_format_index: u8,
    pub b_num_frame_descriptors: u8,
    pub guid_format: Guid,
    pub b_bits_per_pixel: u8,
    pub b_default_frame_index: u8,
    pub b_aspect_ratio_x: u8,
    pub b_aspect_ratio_y: u8,
    pub bm_interlace_flags: u8,
    pub b_copy_protect: u8,
}

impl FormatUncompressed {
    pub const LEN: usize = 27;
}

/// Frame-based payload format short form.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FormatFrameBased {
    pub b_format_index: u8,
    pub b_num_frame_descriptors: u8,
    pub guid_format: Guid,
    pub b_bits_per_pixel: u8,
    pub b_default_frame_index: u8,
    pub b_aspect_ratio_x: u8,
    pub b_aspect_ratio_y: u8,
    pub bm_interlace_flags: u8,
    pub b_copy_protect: u8,
    pub b_variable_size: u8,
}

impl FormatFrameBased {
    pub const LEN: usize = 28;
}

/// Uncompressed frame short form. When `b_frame_interval_type` is zero
/// the frame is continuous and the maker expects exactly three intervals
/// (min, max, granularity); otherwise it expects exactly
/// `b_frame_interval_type` discrete intervals.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FrameUncompressed {
    pub b_frame_index: u8,
    pub bm_capabilities: u8,
    pub w_width: u16,
    pub w_height: u16,
    pub dw_min_bit_rate: u32,
    pub dw_max_bit_rate: u32,
    pub dw_max_video_frame_buffer_size: u32,
    pub dw_default_frame_interval: u32,
    pub b_frame_interval_type: u8,
}

impl FrameUncompressed {
    pub const FIXED_LEN: usize = 26;
}

/// Frame-based frame short form; carries `dw_bytes_per_line` where the
/// uncompressed shape carries a frame buffer size. The interval rule is
/// the same as for [`FrameUncompressed`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FrameFrameBased {
    pub b_frame_index: u8,
    pub bm_capabilities: u8,
    pub w_width: u16,
    pub w_height: u16,
    pub dw_min_bit_rate: u32,
    pub dw_max_bit_rate: u32,
    pub dw_default_frame_interval: u32,
    pub b_frame_interval_type: u8,
    pub dw_bytes_per_line: u32,
}

impl FrameFrameBased {
    pub const FIXED_LEN: usize = 26;
}
