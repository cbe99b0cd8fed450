//! Standard USB descriptor types and short forms.
//!
//! These follow §9.5 and 9.6 of the USB 3.x specification. The short
//! forms carry only the fields a caller must decide; everything the
//! builder can derive itself (lengths, type codes, `bMaxPacketSize0`) is
//! filled in at build time.

/// Wire values for the `bDescriptorType` field.
#[derive(Clone, Copy, Debug, PartialEq, strum_macros::FromRepr)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum DescriptorType {
    Device = 1,
    Configuration = 2,
    String = 3,
    Interface = 4,
    Endpoint = 5,

    DeviceQualifier = 6,
    OtherSpeed = 7,
    InterfacePower = 8,
    InterfaceAssociation = 0xB,

    BinaryObjectStore = 0xF,
    DeviceCapability = 0x10,

    ClassInterface = 0x24,
    ClassEndpoint = 0x25,

    SuperSpeedEndpointComp = 0x30,
}

/// A Microsoft-convention GUID as carried in UVC format and extension
/// unit descriptors.
///
/// On the wire the three integer components are each little-endian; the
/// 8-byte tail is copied verbatim. The asymmetry is part of the GUID wire
/// convention, not a builder choice.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Guid {
    pub data1: u32,
    pub data2: u16,
    pub data3: u16,
    pub data4: [u8; 8],
}

/// Device descriptor short form. `bMaxPacketSize0` is derived from
/// `bcd_usb` at build time: 64 below USB 3.0, the log2 code 9 at or
/// above.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Device {
    pub bcd_usb: u16,
    pub b_device_class: u8,
    pub b_device_sub_class: u8,
    pub b_device_protocol: u8,
    pub id_vendor: u16,
    pub id_product: u16,
    pub bcd_device: u16,
    pub i_manufacturer: u8,
    pub i_product: u8,
    pub i_serial_number: u8,
    pub b_num_configurations: u8,
}

impl Device {
    pub const LEN: usize = 18;
}

/// Device qualifier short form; `bMaxPacketSize0` is derived as for
/// [`Device`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceQualifier {
    pub bcd_usb: u16,
    pub b_device_class: u8,
    pub b_device_sub_class: u8,
    pub b_device_protocol: u8,
    pub b_num_configurations: u8,
}

impl DeviceQualifier {
    pub const LEN: usize = 10;
}

/// Configuration descriptor short form. The interface count is supplied
/// here, but the interfaces themselves must also be adopted as children
/// so the `wTotalLength` backpatch can account for them.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Configuration {
    pub b_num_interfaces: u8,
    pub b_configuration_value: u8,
    pub i_configuration: u8,
    pub bm_attributes: u8,
    pub b_max_power: u8,
}

impl Configuration {
    pub const LEN: usize = 9;
}

/// Standard interface descriptor short form. By varying class, subclass
/// and protocol this one shape covers several descriptor needs; the UVC
/// helpers in [`crate::uvc`] pre-fill those three for video interfaces.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Interface {
    pub b_interface_number: u8,
    pub b_alternate_setting: u8,
    pub b_num_endpoints: u8,
    pub b_interface_class: u8,
    pub b_interface_sub_class: u8,
    pub b_interface_protocol: u8,
    pub i_interface: u8,
}

impl Interface {
    pub const LEN: usize = 9;
}

/// Interface association descriptor short form.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InterfaceAssociation {
    pub b_first_interface: u8,
    pub b_interface_count: u8,
    pub b_function_class: u8,
    pub b_function_sub_class: u8,
    pub b_function_protocol: u8,
    pub i_function: u8,
}

impl InterfaceAssociation {
    pub const LEN: usize = 8;
}

/// Endpoint descriptor short form.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Endpoint {
    pub b_endpoint_address: u8,
    pub bm_attributes: u8,
    pub w_max_packet_size: u16,
    pub b_interval: u8,
}

impl Endpoint {
    pub const LEN: usize = 7;
}

/// SuperSpeed endpoint companion short form. cf. §9.6.7 of USB 3.1.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SsEpCompanion {
    pub b_max_burst: u8,
    pub bm_attributes: u8,
    pub w_bytes_per_interval: u16,
}

impl SsEpCompanion {
    pub const LEN: usize = 6;
}

/// Iterator over a finished, flat descriptor region, yielding one
/// length-prefixed record at a time.
///
/// This is an aid for checking built output, not a parser: it stops at
/// the first record that is truncated or shorter than a header.
pub struct Descriptors<'a> {
    bytes: &'a [u8],
}

impl<'a> Descriptors<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Descriptors { bytes }
    }
}

impl<'a> Iterator for Descriptors<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<&'a [u8]> {
        let len = *self.bytes.first()? as usize;
        if len < 2 || len > self.bytes.len() {
            return None;
        }
        let (record, rest) = self.bytes.split_at(len);
        self.bytes = rest;
        Some(record)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn walks_records_by_length_prefix() {
        let flat = [9u8, 2, 0, 0, 0, 0, 0, 0, 0, 7, 5, 0x81, 2, 0, 2, 1];
        let mut it = Descriptors::new(&flat);
        let config = it.next().unwrap();
        assert_eq!(config.len(), 9);
        assert_eq!(DescriptorType::from_repr(config[1]), Some(DescriptorType::Configuration));
        let ep = it.next().unwrap();
        assert_eq!(ep.len(), 7);
        assert_eq!(ep[2], 0x81);
        assert!(it.next().is_none());
    }

    #[test]
    fn stops_on_truncated_record() {
        let flat = [9u8, 2, 0];
        assert!(Descriptors::new(&flat).next().is_none());
    }
}
