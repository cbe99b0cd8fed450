//! The descriptor builder session: arena bookkeeping, the maker calls,
//! and the hierarchical length composer.
//!
//! Every maker follows the same contract: validate the short form,
//! compute the exact record length up front, gate it against the
//! one-byte length limit and the remaining buffer space, and only then
//! write fields in wire order. A failed call leaves the buffer, cursor
//! and counters untouched. The cursor advances identically whether a
//! buffer is attached or the session is a dry run, so size accounting is
//! the same either way.

use heapless::Vec;

use crate::descriptor::{self, DescriptorType, Guid};
use crate::endian::Endian;
use crate::item::{Item, MAX_CHILDREN};
use crate::uvc;
use crate::Error;

/// Capacity of the bounded parameter buffers behind the `*_from`
/// sequence adapters. The longest list in the catalogued descriptors is
/// the seven-entry frame interval table.
pub const PARAM_MAX: usize = 10;

/// A descriptor construction session.
///
/// Owns the append cursor, the string and configuration index counters
/// and the endian adapter, and borrows the caller's buffer for the
/// session's lifetime. One session per thread; independent sessions over
/// separate buffers are free to run concurrently.
pub struct DescriptorBuilder<'a> {
    initialized: bool,
    buffer: Option<&'a mut [u8]>,
    append: usize,
    next_string: u16,
    next_configuration: u16,
    endian: Endian,
}

/// Writes the fields of one record, in declaration order, converting
/// multi-byte values to wire order on the way through.
struct FieldWriter<'w> {
    dest: &'w mut [u8],
    at: usize,
    endian: Endian,
}

impl FieldWriter<'_> {
    fn u8(&mut self, v: u8) {
        self.dest[self.at] = v;
        self.at += 1;
    }

    fn u16(&mut self, v: u16) {
        let wire = (self.endian.short_to_wire)(v);
        self.dest[self.at..self.at + 2].copy_from_slice(&wire.to_ne_bytes());
        self.at += 2;
    }

    fn u32(&mut self, v: u32) {
        let wire = (self.endian.int_to_wire)(v);
        self.dest[self.at..self.at + 4].copy_from_slice(&wire.to_ne_bytes());
        self.at += 4;
    }

    fn bytes(&mut self, v: &[u8]) {
        self.dest[self.at..self.at + v.len()].copy_from_slice(v);
        self.at += v.len();
    }

    // The integer components convert individually; the tail is opaque.
    fn guid(&mut self, g: &Guid) {
        self.u32(g.data1);
        self.u16(g.data2);
        self.u16(g.data3);
        self.bytes(&g.data4);
    }
}

impl<'a> DescriptorBuilder<'a> {
    /// Start a session over the caller's buffer.
    pub fn new(buffer: &'a mut [u8]) -> Self {
        let mut bldr = Self::bare();
        bldr.init(Some(buffer));
        bldr
    }

    /// Start a size-only session: makers validate and account exactly as
    /// with a real buffer, but write nothing.
    pub fn dry_run() -> Self {
        let mut bldr = Self::bare();
        bldr.init(None);
        bldr
    }

    fn bare() -> Self {
        DescriptorBuilder {
            initialized: false,
            buffer: None,
            append: 0,
            next_string: 0,
            next_configuration: 0,
            endian: Endian::detect(),
        }
    }

    /// Reset the cursor and counters and re-arm the session, optionally
    /// against a different buffer (`None` = dry run). Required after
    /// [`end`](Self::end) before anything will perform again.
    pub fn init(&mut self, buffer: Option<&'a mut [u8]>) {
        self.buffer = buffer;
        self.append = 0;
        self.next_string = 0;
        self.next_configuration = 0;
        self.endian = Endian::detect();
        self.initialized = true;
    }

    /// Commit the session. Currently a no-op reserved for future use;
    /// succeeds unconditionally.
    pub fn close(&mut self) -> Result<(), Error> {
        Ok(())
    }

    /// Terminate the session. There are no resources to release; the
    /// only effect is that further calls fail `Uninitialized` until
    /// [`init`](Self::init) is called again.
    pub fn end(&mut self) -> Result<(), Error> {
        self.initialized = false;
        Ok(())
    }

    /// Whether this session is size-only.
    pub fn is_dry_run(&self) -> bool {
        self.buffer.is_none()
    }

    /// Bytes consumed so far — in dry-run mode, the running total.
    pub fn used(&self) -> usize {
        self.append
    }

    /// Remaining capacity of the attached buffer, if any.
    pub fn remaining(&self) -> Option<usize> {
        self.buffer.as_ref().map(|buf| buf.len() - self.append)
    }

    /// The item's own record bytes. `None` in dry-run mode.
    pub fn descriptor_bytes(&self, item: &Item) -> Option<&[u8]> {
        self.buffer
            .as_ref()
            .map(|buf| &buf[item.address..item.address + item.size as usize])
    }

    /// The item's bytes spanning its accumulated total length — the
    /// record plus every descendant folded in by `add_children`. `None`
    /// in dry-run mode.
    pub fn emitted(&self, item: &Item) -> Option<&[u8]> {
        let len = self.effective(item) as usize;
        self.buffer
            .as_ref()
            .map(|buf| &buf[item.address..item.address + len])
    }

    /// Own size, or the backpatched total once descendants have been
    /// folded in.
    pub fn total_length(&self, item: &Item) -> u16 {
        self.effective(item)
    }

    fn ready(&self) -> Result<(), Error> {
        if self.initialized {
            Ok(())
        } else {
            Err(Error::Uninitialized)
        }
    }

    /// Gate a pending record of `needs` bytes: the one-byte length field
    /// bound first, then space in the attached buffer. Writes nothing.
    fn fit(&self, needs: usize) -> Result<(), Error> {
        if needs > 0xff {
            return Err(Error::Oversized);
        }
        if let Some(buf) = &self.buffer {
            if needs > buf.len() - self.append {
                return Err(Error::NoSpace);
            }
        }
        Ok(())
    }

    /// Zero the destination region and hand out a writer over it, or
    /// `None` in dry-run mode. Call only after [`fit`](Self::fit).
    fn start(&mut self, needs: usize) -> Option<FieldWriter<'_>> {
        let endian = self.endian;
        let at = self.append;
        match &mut self.buffer {
            Some(buf) => {
                let dest = &mut buf[at..at + needs];
                dest.fill(0);
                Some(FieldWriter { dest, at: 0, endian })
            }
            None => None,
        }
    }

    /// Build the output item and consume the record's bytes (or, in a
    /// dry run, just count them).
    fn commit(&mut self, needs: usize) -> Item {
        let item = Item::new(self.append, needs as u16);
        self.append += needs;
        item
    }

    /// Current value of an item's backpatched total, falling back to its
    /// own size; everything includes itself.
    fn effective(&self, item: &Item) -> u16 {
        match (item.total_at, &self.buffer) {
            (Some(at), Some(buf)) => {
                let raw = u16::from_ne_bytes([buf[at], buf[at + 1]]);
                let host = (self.endian.short_from_wire)(raw);
                if host != 0 {
                    host
                } else {
                    item.size
                }
            }
            (Some(_), None) => item.shadow_effective(),
            (None, _) => item.size,
        }
    }

    /// Store an accumulated total into the item's backpatch field, both
    /// in the buffer (wire order) and in the item's shadow.
    fn write_total(&mut self, item: &mut Item, value: u16) {
        item.total = value;
        if let (Some(at), Some(buf)) = (item.total_at, &mut self.buffer) {
            let wire = (self.endian.short_to_wire)(value);
            buf[at..at + 2].copy_from_slice(&wire.to_ne_bytes());
        }
    }

    // ////////////////////////////////////////////////////////////////
    // Composition

    /// Adopt `children` under `parent`, folding their effective sizes
    /// (own size, or their already-accumulated totals) into the parent's
    /// backpatched total-length field.
    ///
    /// Cumulative: repeated calls with further children keep adding.
    /// Never moves bytes — the physical order of records was fixed by
    /// the maker calls, and this only patches a length field.
    pub fn add_children(&mut self, parent: &mut Item, children: &[&Item]) -> Result<(), Error> {
        self.ready()?;
        if parent.children.len() + children.len() > MAX_CHILDREN {
            return Err(Error::TooMany);
        }

        let mut sum = self.effective(parent);
        for child in children {
            sum = sum.wrapping_add(self.effective(child));
            if parent.children.push(child.address).is_err() {
                return Err(Error::TooMany);
            }
        }

        if parent.total_at.is_some() {
            self.write_total(parent, sum);
        }
        Ok(())
    }

    // ////////////////////////////////////////////////////////////////
    // Standard USB makers

    /// Device descriptor. `bMaxPacketSize0` is derived from `bcd_usb`:
    /// 64 below USB 3.0, the log2 code (2^9 = 512) at or above.
    pub fn device(&mut self, form: &descriptor::Device) -> Result<Item, Error> {
        self.ready()?;
        let needs = descriptor::Device::LEN;
        self.fit(needs)?;

        if let Some(mut w) = self.start(needs) {
            w.u8(needs as u8);
            w.u8(DescriptorType::Device as u8);
            w.u16(form.bcd_usb);
            w.u8(form.b_device_class);
            w.u8(form.b_device_sub_class);
            w.u8(form.b_device_protocol);
            w.u8(max_packet_size0(form.bcd_usb));
            w.u16(form.id_vendor);
            w.u16(form.id_product);
            w.u16(form.bcd_device);
            w.u8(form.i_manufacturer);
            w.u8(form.i_product);
            w.u8(form.i_serial_number);
            w.u8(form.b_num_configurations);
        }

        Ok(self.commit(needs))
    }

    /// Device qualifier descriptor, cf. §9.6.2 of USB 2.0.
    pub fn device_qualifier(&mut self, form: &descriptor::DeviceQualifier) -> Result<Item, Error> {
        self.ready()?;
        let needs = descriptor::DeviceQualifier::LEN;
        self.fit(needs)?;

        if let Some(mut w) = self.start(needs) {
            w.u8(needs as u8);
            w.u8(DescriptorType::DeviceQualifier as u8);
            w.u16(form.bcd_usb);
            w.u8(form.b_device_class);
            w.u8(form.b_device_sub_class);
            w.u8(form.b_device_protocol);
            w.u8(max_packet_size0(form.bcd_usb));
            w.u8(form.b_num_configurations);
            w.u8(0); // bReserved
        }

        Ok(self.commit(needs))
    }

    /// Configuration descriptor. Registers the `wTotalLength` backpatch
    /// target and assigns the next configuration index to the item.
    pub fn configuration(&mut self, form: &descriptor::Configuration) -> Result<Item, Error> {
        self.ready()?;
        if self.next_configuration > 0xff {
            return Err(Error::TooMany);
        }
        let needs = descriptor::Configuration::LEN;
        self.fit(needs)?;

        if let Some(mut w) = self.start(needs) {
            w.u8(needs as u8);
            w.u8(DescriptorType::Configuration as u8);
            w.u16(0); // wTotalLength, patched by add_children
            w.u8(form.b_num_interfaces);
            w.u8(form.b_configuration_value);
            w.u8(form.i_configuration);
            w.u8(form.bm_attributes);
            w.u8(form.b_max_power);
        }

        let mut item = self.commit(needs);
        item.total_at = Some(item.address + 2);
        item.index = self.next_configuration as u8;
        self.next_configuration += 1;
        Ok(item)
    }

    /// Standard interface descriptor.
    pub fn interface(&mut self, form: &descriptor::Interface) -> Result<Item, Error> {
        self.ready()?;
        let needs = descriptor::Interface::LEN;
        self.fit(needs)?;

        if let Some(mut w) = self.start(needs) {
            w.u8(needs as u8);
            w.u8(DescriptorType::Interface as u8);
            w.u8(form.b_interface_number);
            w.u8(form.b_alternate_setting);
            w.u8(form.b_num_endpoints);
            w.u8(form.b_interface_class);
            w.u8(form.b_interface_sub_class);
            w.u8(form.b_interface_protocol);
            w.u8(form.i_interface);
        }

        Ok(self.commit(needs))
    }

    /// Interface association descriptor.
    pub fn interface_association(
        &mut self,
        form: &descriptor::InterfaceAssociation,
    ) -> Result<Item, Error> {
        self.ready()?;
        let needs = descriptor::InterfaceAssociation::LEN;
        self.fit(needs)?;

        if let Some(mut w) = self.start(needs) {
            w.u8(needs as u8);
            w.u8(DescriptorType::InterfaceAssociation as u8);
            w.u8(form.b_first_interface);
            w.u8(form.b_interface_count);
            w.u8(form.b_function_class);
            w.u8(form.b_function_sub_class);
            w.u8(form.b_function_protocol);
            w.u8(form.i_function);
        }

        Ok(self.commit(needs))
    }

    /// Endpoint descriptor. The item's index slot carries the endpoint
    /// address.
    pub fn endpoint(&mut self, form: &descriptor::Endpoint) -> Result<Item, Error> {
        self.ready()?;
        let needs = descriptor::Endpoint::LEN;
        self.fit(needs)?;

        if let Some(mut w) = self.start(needs) {
            w.u8(needs as u8);
            w.u8(DescriptorType::Endpoint as u8);
            w.u8(form.b_endpoint_address);
            w.u8(form.bm_attributes);
            w.u16(form.w_max_packet_size);
            w.u8(form.b_interval);
        }

        let mut item = self.commit(needs);
        item.index = form.b_endpoint_address;
        Ok(item)
    }

    /// SuperSpeed endpoint companion descriptor.
    pub fn ss_ep_companion(&mut self, form: &descriptor::SsEpCompanion) -> Result<Item, Error> {
        self.ready()?;
        let needs = descriptor::SsEpCompanion::LEN;
        self.fit(needs)?;

        if let Some(mut w) = self.start(needs) {
            w.u8(needs as u8);
            w.u8(DescriptorType::SuperSpeedEndpointComp as u8);
            w.u8(form.b_max_burst);
            w.u8(form.bm_attributes);
            w.u16(form.w_bytes_per_interval);
        }

        Ok(self.commit(needs))
    }

    /// Binary Object Store header. Device capabilities follow it in the
    /// buffer and are adopted as children to complete the store.
    pub fn bos(&mut self, capabilities: u8) -> Result<Item, Error> {
        self.ready()?;
        let needs = 5;
        self.fit(needs)?;

        if let Some(mut w) = self.start(needs) {
            w.u8(needs as u8);
            w.u8(DescriptorType::BinaryObjectStore as u8);
            w.u16(0); // wTotalLength, patched by add_children
            w.u8(capabilities);
        }

        let mut item = self.commit(needs);
        item.total_at = Some(item.address + 2);
        Ok(item)
    }

    /// Device capability descriptor with anonymous type-dependent data.
    pub fn device_capability(&mut self, capability_type: u8, data: &[u8]) -> Result<Item, Error> {
        self.ready()?;
        let needs = 3 + data.len();
        self.fit(needs)?;

        if let Some(mut w) = self.start(needs) {
            w.u8(needs as u8);
            w.u8(DescriptorType::DeviceCapability as u8);
            w.u8(capability_type);
            w.bytes(data);
        }

        Ok(self.commit(needs))
    }

    /// The supported-languages string descriptor, architected to be
    /// string index 0. There may only be one per session; a second call
    /// fails `TooMany`.
    pub fn language_ids(&mut self, langs: &[u16]) -> Result<Item, Error> {
        self.ready()?;
        if self.next_string != 0 {
            return Err(Error::TooMany);
        }
        let needs = 2 + 2 * langs.len();
        self.fit(needs)?;

        if let Some(mut w) = self.start(needs) {
            w.u8(needs as u8);
            w.u8(DescriptorType::String as u8);
            for &lang in langs {
                w.u16(lang);
            }
        }

        let mut item = self.commit(needs);
        item.index = 0;
        self.next_string = 1;
        Ok(item)
    }

    /// String descriptor from an ASCII string: one zero-extended 16-bit
    /// slot per input byte, no terminator. Indices are assigned in
    /// strictly increasing order; the item's index slot carries the
    /// assignment.
    pub fn string(&mut self, string: &str) -> Result<Item, Error> {
        self.ready()?;
        // String indices are bytes, limiting the number of them.
        if self.next_string > 0xff {
            return Err(Error::TooMany);
        }
        let needs = 2 + 2 * string.len();
        self.fit(needs)?;

        if let Some(mut w) = self.start(needs) {
            w.u8(needs as u8);
            w.u8(DescriptorType::String as u8);
            for ch in string.bytes() {
                w.u16(ch as u16);
            }
        }

        let mut item = self.commit(needs);
        item.index = self.next_string as u8;
        self.next_string += 1;
        Ok(item)
    }

    // ////////////////////////////////////////////////////////////////
    // UVC Video Control makers

    /// Video Control interface descriptor: a standard interface with the
    /// video class, VC subclass and revision protocol filled in.
    pub fn vc_interface(&mut self, form: &uvc::VcInterface) -> Result<Item, Error> {
        self.interface(&descriptor::Interface {
            b_interface_number: form.b_interface_number,
            b_alternate_setting: form.b_alternate_setting,
            b_num_endpoints: form.b_num_endpoints,
            b_interface_class: uvc::CC_VIDEO,
            b_interface_sub_class: uvc::SC_VIDEOCONTROL,
            b_interface_protocol: uvc::protocol_code(),
            i_interface: form.i_interface,
        })
    }

    /// Video Streaming interface descriptor.
    pub fn vs_interface(&mut self, form: &uvc::VsInterface) -> Result<Item, Error> {
        self.interface(&descriptor::Interface {
            b_interface_number: form.b_interface_number,
            b_alternate_setting: form.b_alternate_setting,
            b_num_endpoints: form.b_num_endpoints,
            b_interface_class: uvc::CC_VIDEO,
            b_interface_sub_class: uvc::SC_VIDEOSTREAMING,
            b_interface_protocol: uvc::protocol_code(),
            i_interface: form.i_interface,
        })
    }

    /// Class-specific VC interface header. The caller is responsible for
    /// the numbers in `interfaces` matching the interfaces this header
    /// encloses. Registers the `wTotalLength` backpatch target.
    pub fn vc_header(&mut self, clock_hz: u32, interfaces: &[u8]) -> Result<Item, Error> {
        self.ready()?;
        if interfaces.len() > 0xff {
            return Err(Error::TooMany);
        }
        let needs = 12 + interfaces.len();
        self.fit(needs)?;

        if let Some(mut w) = self.start(needs) {
            w.u8(needs as u8);
            w.u8(uvc::CS_INTERFACE);
            w.u8(uvc::VC_HEADER);
            w.u16(uvc::bcd_uvc());
            w.u16(0); // wTotalLength, patched by add_children
            w.u32(clock_hz);
            w.u8(interfaces.len() as u8); // bInCollection
            w.bytes(interfaces);
        }

        let mut item = self.commit(needs);
        item.total_at = Some(item.address + 5);
        Ok(item)
    }

    /// Camera (input) terminal. The terminal type is fixed to
    /// ITT_CAMERA; the 3-byte control bitmap is the low bytes of
    /// `bm_controls`.
    pub fn camera_terminal(&mut self, form: &uvc::CameraTerminal) -> Result<Item, Error> {
        self.ready()?;
        let needs = uvc::CameraTerminal::LEN;
        self.fit(needs)?;

        if let Some(mut w) = self.start(needs) {
            w.u8(needs as u8);
            w.u8(uvc::CS_INTERFACE);
            w.u8(uvc::VC_INPUT_TERMINAL);
            w.u8(form.b_terminal_id);
            w.u16(uvc::ITT_CAMERA);
            w.u8(form.b_assoc_terminal);
            w.u8(form.i_terminal);
            w.u16(form.w_objective_focal_length_min);
            w.u16(form.w_objective_focal_length_max);
            w.u16(form.w_ocular_focal_length);
            w.u8(3); // bControlSize
            w.bytes(&form.bm_controls.to_le_bytes()[..3]);
        }

        Ok(self.commit(needs))
    }

    /// Streaming (output) terminal; terminal type fixed to
    /// OTT_STREAMING.
    pub fn streaming_out_terminal(
        &mut self,
        form: &uvc::StreamingOutTerminal,
    ) -> Result<Item, Error> {
        self.ready()?;
        let needs = uvc::StreamingOutTerminal::LEN;
        self.fit(needs)?;

        if let Some(mut w) = self.start(needs) {
            w.u8(needs as u8);
            w.u8(uvc::CS_INTERFACE);
            w.u8(uvc::VC_OUTPUT_TERMINAL);
            w.u8(form.b_terminal_id);
            w.u16(uvc::OTT_STREAMING);
            w.u8(form.b_assoc_terminal);
            w.u8(form.b_source_id);
            w.u8(form.i_terminal);
        }

        Ok(self.commit(needs))
    }

    /// Selector unit: header, unit id, then the input pin list and the
    /// trailing iSelector string index.
    pub fn selector_unit(
        &mut self,
        i_selector: u8,
        unit_id: u8,
        inputs: &[u8],
    ) -> Result<Item, Error> {
        self.ready()?;
        if inputs.len() > 0xff {
            return Err(Error::TooMany);
        }
        let needs = 6 + inputs.len();
        self.fit(needs)?;

        if let Some(mut w) = self.start(needs) {
            w.u8(needs as u8);
            w.u8(uvc::CS_INTERFACE);
            w.u8(uvc::VC_SELECTOR_UNIT);
            w.u8(unit_id);
            w.u8(inputs.len() as u8); // bNrInPins
            w.bytes(inputs);
            w.u8(i_selector);
        }

        Ok(self.commit(needs))
    }

    /// Processing unit. Emits the 3-byte control bitmap from the low
    /// bytes of `bm_controls`; `bmVideoStandards` is appended on UVC 1.1
    /// and above only.
    pub fn processing_unit(&mut self, form: &uvc::ProcessingUnit) -> Result<Item, Error> {
        self.ready()?;
        let needs = uvc::ProcessingUnit::LEN;
        self.fit(needs)?;

        if let Some(mut w) = self.start(needs) {
            w.u8(needs as u8);
            w.u8(uvc::CS_INTERFACE);
            w.u8(uvc::VC_PROCESSING_UNIT);
            w.u8(form.b_unit_id);
            w.u8(form.b_source_id);
            w.u16(form.w_max_multiplier);
            w.u8(3); // bControlSize
            w.bytes(&form.bm_controls.to_le_bytes()[..3]);
            w.u8(form.i_processing);
            if cfg!(any(feature = "uvc11", feature = "uvc15")) {
                w.u8(form.bm_video_standards);
            }
        }

        Ok(self.commit(needs))
    }

    /// Extension unit. A complex record with variable-size segments and
    /// fixed fields intermingled: the fixed prefix, then the source pin
    /// list, then `bControlSize`, the control bitmap, and `iExtension`.
    /// The total is computed from all segments before anything is
    /// written.
    pub fn extension_unit(
        &mut self,
        form: &uvc::ExtensionUnit,
        sources: &[u8],
    ) -> Result<Item, Error> {
        self.ready()?;
        let needs = uvc::ExtensionUnit::FIXED_LEN   // prefix through bNrInPins
            + sources.len()                         // baSourceID
            + 1                                     // bControlSize
            + form.bm_controls.len()                // bmControls
            + 1; // iExtension
        self.fit(needs)?;

        if let Some(mut w) = self.start(needs) {
            w.u8(needs as u8);
            w.u8(uvc::CS_INTERFACE);
            w.u8(uvc::VC_EXTENSION_UNIT);
            w.u8(form.b_unit_id);
            w.guid(&form.guid_extension_code);
            w.u8(form.b_num_controls);
            w.u8(sources.len() as u8); // bNrInPins
            w.bytes(sources);
            w.u8(form.bm_controls.len() as u8); // bControlSize
            w.bytes(form.bm_controls);
            w.u8(form.i_extension);
        }

        Ok(self.commit(needs))
    }

    /// Class-specific VC interrupt endpoint descriptor.
    pub fn vc_interrupt_endpoint(&mut self, max_transfer_size: u16) -> Result<Item, Error> {
        self.ready()?;
        let needs = 5;
        self.fit(needs)?;

        if let Some(mut w) = self.start(needs) {
            w.u8(needs as u8);
            w.u8(uvc::CS_ENDPOINT);
            w.u8(uvc::EP_INTERRUPT);
            w.u16(max_transfer_size);
        }

        Ok(self.commit(needs))
    }

    // ////////////////////////////////////////////////////////////////
    // UVC Video Streaming makers

    /// VS interface input header. One control byte per format;
    /// `bNumFormats` is the control list length. Registers the
    /// `wTotalLength` backpatch target.
    pub fn vs_input_header(
        &mut self,
        form: &uvc::VsInputHeader,
        controls: &[u8],
    ) -> Result<Item, Error> {
        self.ready()?;
        if controls.len() > 0xff {
            return Err(Error::TooMany);
        }
        let needs = uvc::VsInputHeader::FIXED_LEN + controls.len();
        self.fit(needs)?;

        if let Some(mut w) = self.start(needs) {
            w.u8(needs as u8);
            w.u8(uvc::CS_INTERFACE);
            w.u8(uvc::VS_INPUT_HEADER);
            w.u8(controls.len() as u8); // bNumFormats
            w.u16(0); // wTotalLength, patched by add_children
            w.u8(form.b_endpoint_address);
            w.u8(form.bm_info);
            w.u8(form.b_terminal_link);
            w.u8(form.b_still_capture_method);
            w.u8(form.b_trigger_support);
            w.u8(form.b_trigger_usage);
            w.u8(1); // bControlSize, standardized for now
            w.bytes(controls);
        }

        let mut item = self.commit(needs);
        item.total_at = Some(item.address + 4);
        Ok(item)
    }

    /// VS interface output header; same derivations as the input header
    /// without the capture/trigger fields.
    pub fn vs_output_header(
        &mut self,
        form: &uvc::VsOutputHeader,
        controls: &[u8],
    ) -> Result<Item, Error> {
        self.ready()?;
        if controls.len() > 0xff {
            return Err(Error::TooMany);
        }
        let needs = uvc::VsOutputHeader::FIXED_LEN + controls.len();
        self.fit(needs)?;

        if let Some(mut w) = self.start(needs) {
            w.u8(needs as u8);
            w.u8(uvc::CS_INTERFACE);
            w.u8(uvc::VS_OUTPUT_HEADER);
            w.u8(controls.len() as u8); // bNumFormats
            w.u16(0); // wTotalLength, patched by add_children
            w.u8(form.b_endpoint_address);
            w.u8(form.b_terminal_link);
            w.u8(1); // bControlSize
            w.bytes(controls);
        }

        let mut item = self.commit(needs);
        item.total_at = Some(item.address + 4);
        Ok(item)
    }

    /// Uncompressed payload format descriptor.
    pub fn format_uncompressed(&mut self, form: &uvc::FormatUncompressed) -> Result<Item, Error> {
        self.ready()?;
        let needs = uvc::FormatUncompressed::LEN;
        self.fit(needs)?;

        if let Some(mut w) = self.start(needs) {
            w.u8(needs as u8);
            w.u8(uvc::CS_INTERFACE);
            w.u8(uvc::VS_FORMAT_UNCOMPRESSED);
            w.u8(form.b_format_index);
            w.u8(form.b_num_frame_descriptors);
            w.guid(&form.guid_format);
            w.u8(form.b_bits_per_pixel);
            w.u8(form.b_default_frame_index);
            w.u8(form.b_aspect_ratio_x);
            w.u8(form.b_aspect_ratio_y);
            w.u8(form.bm_interlace_flags);
            w.u8(form.b_copy_protect);
        }

        Ok(self.commit(needs))
    }

    /// Frame-based payload format descriptor.
    pub fn format_frame_based(&mut self, form: &uvc::FormatFrameBased) -> Result<Item, Error> {
        self.ready()?;
        let needs = uvc::FormatFrameBased::LEN;
        self.fit(needs)?;

        if let Some(mut w) = self.start(needs) {
            w.u8(needs as u8);
            w.u8(uvc::CS_INTERFACE);
            w.u8(uvc::VS_FORMAT_FRAME_BASED);
            w.u8(form.b_format_index);
            w.u8(form.b_num_frame_descriptors);
            w.guid(&form.guid_format);
            w.u8(form.b_bits_per_pixel);
            w.u8(form.b_default_frame_index);
            w.u8(form.b_aspect_ratio_x);
            w.u8(form.b_aspect_ratio_y);
            w.u8(form.bm_interlace_flags);
            w.u8(form.b_copy_protect);
            w.u8(form.b_variable_size);
        }

        Ok(self.commit(needs))
    }

    /// Uncompressed frame descriptor. The interval count must agree with
    /// `b_frame_interval_type`: three entries (min, max, granularity)
    /// when continuous (type 0), exactly the type's value otherwise.
    pub fn frame_uncompressed(
        &mut self,
        form: &uvc::FrameUncompressed,
        intervals: &[u32],
    ) -> Result<Item, Error> {
        self.ready()?;
        let expected = interval_count(form.b_frame_interval_type);
        if intervals.len() != expected {
            return Err(Error::Invalid);
        }
        let needs = uvc::FrameUncompressed::FIXED_LEN + 4 * expected;
        self.fit(needs)?;

        if let Some(mut w) = self.start(needs) {
            w.u8(needs as u8);
            w.u8(uvc::CS_INTERFACE);
            w.u8(uvc::VS_FRAME_UNCOMPRESSED);
            w.u8(form.b_frame_index);
            w.u8(form.bm_capabilities);
            w.u16(form.w_width);
            w.u16(form.w_height);
            w.u32(form.dw_min_bit_rate);
            w.u32(form.dw_max_bit_rate);
            w.u32(form.dw_max_video_frame_buffer_size);
            w.u32(form.dw_default_frame_interval);
            w.u8(form.b_frame_interval_type);
            for &ival in intervals {
                w.u32(ival);
            }
        }

        Ok(self.commit(needs))
    }

    /// Frame-based frame descriptor; the same interval rule as
    /// [`frame_uncompressed`](Self::frame_uncompressed), with
    /// `dwBytesPerLine` in the fixed part.
    pub fn frame_frame_based(
        &mut self,
        form: &uvc::FrameFrameBased,
        intervals: &[u32],
    ) -> Result<Item, Error> {
        self.ready()?;
        let expected = interval_count(form.b_frame_interval_type);
        if intervals.len() != expected {
            return Err(Error::Invalid);
        }
        let needs = uvc::FrameFrameBased::FIXED_LEN + 4 * expected;
        self.fit(needs)?;

        if let Some(mut w) = self.start(needs) {
            w.u8(needs as u8);
            w.u8(uvc::CS_INTERFACE);
            w.u8(uvc::VS_FRAME_FRAME_BASED);
            w.u8(form.b_frame_index);
            w.u8(form.bm_capabilities);
            w.u16(form.w_width);
            w.u16(form.w_height);
            w.u32(form.dw_min_bit_rate);
            w.u32(form.dw_max_bit_rate);
            w.u32(form.dw_default_frame_interval);
            w.u8(form.b_frame_interval_type);
            w.u32(form.dw_bytes_per_line);
            for &ival in intervals {
                w.u32(ival);
            }
        }

        Ok(self.commit(needs))
    }

    // ////////////////////////////////////////////////////////////////
    // Bounded sequence adapters
    //
    // Convenience forms of the variable-length makers taking any
    // sequence, collected into a stack buffer of capacity PARAM_MAX.

    /// [`language_ids`](Self::language_ids) from a sequence.
    pub fn language_ids_from<I>(&mut self, langs: I) -> Result<Item, Error>
    where
        I: IntoIterator<Item = u16>,
    {
        let langs = collect_bounded(langs)?;
        self.language_ids(&langs)
    }

    /// [`vc_header`](Self::vc_header) from a sequence of interface
    /// numbers.
    pub fn vc_header_from<I>(&mut self, clock_hz: u32, interfaces: I) -> Result<Item, Error>
    where
        I: IntoIterator<Item = u8>,
    {
        let interfaces = collect_bounded(interfaces)?;
        self.vc_header(clock_hz, &interfaces)
    }

    /// [`selector_unit`](Self::selector_unit) from a sequence of input
    /// pins.
    pub fn selector_unit_from<I>(
        &mut self,
        i_selector: u8,
        unit_id: u8,
        inputs: I,
    ) -> Result<Item, Error>
    where
        I: IntoIterator<Item = u8>,
    {
        let inputs = collect_bounded(inputs)?;
        self.selector_unit(i_selector, unit_id, &inputs)
    }

    /// [`extension_unit`](Self::extension_unit) from a sequence of
    /// source pins.
    pub fn extension_unit_from<I>(
        &mut self,
        form: &uvc::ExtensionUnit,
        sources: I,
    ) -> Result<Item, Error>
    where
        I: IntoIterator<Item = u8>,
    {
        let sources = collect_bounded(sources)?;
        self.extension_unit(form, &sources)
    }

    /// [`vs_input_header`](Self::vs_input_header) from a sequence of
    /// per-format control bitmaps.
    pub fn vs_input_header_from<I>(
        &mut self,
        form: &uvc::VsInputHeader,
        controls: I,
    ) -> Result<Item, Error>
    where
        I: IntoIterator<Item = u8>,
    {
        let controls = collect_bounded(controls)?;
        self.vs_input_header(form, &controls)
    }

    /// [`vs_output_header`](Self::vs_output_header) from a sequence of
    /// per-format control bitmaps.
    pub fn vs_output_header_from<I>(
        &mut self,
        form: &uvc::VsOutputHeader,
        controls: I,
    ) -> Result<Item, Error>
    where
        I: IntoIterator<Item = u8>,
    {
        let controls = collect_bounded(controls)?;
        self.vs_output_header(form, &controls)
    }

    /// [`frame_uncompressed`](Self::frame_uncompressed) from a sequence
    /// of intervals.
    pub fn frame_uncompressed_from<I>(
        &mut self,
        form: &uvc::FrameUncompressed,
        intervals: I,
    ) -> Result<Item, Error>
    where
        I: IntoIterator<Item = u32>,
    {
        let intervals = collect_bounded(intervals)?;
        self.frame_uncompressed(form, &intervals)
    }

    /// [`frame_frame_based`](Self::frame_frame_based) from a sequence of
    /// intervals.
    pub fn frame_frame_based_from<I>(
        &mut self,
        form: &uvc::FrameFrameBased,
        intervals: I,
    ) -> Result<Item, Error>
    where
        I: IntoIterator<Item = u32>,
    {
        let intervals = collect_bounded(intervals)?;
        self.frame_frame_based(form, &intervals)
    }
}

/// Default `bMaxPacketSize0` for the device and qualifier descriptors:
/// 64 below USB 3.0, the log2 code at or above (2^9 = 512).
fn max_packet_size0(bcd_usb: u16) -> u8 {
    if bcd_usb < 0x0300 {
        64
    } else {
        9
    }
}

/// Continuous frames (type 0) take min/max/granularity; discrete frames
/// enumerate exactly as many intervals as the type value.
fn interval_count(frame_interval_type: u8) -> usize {
    if frame_interval_type == 0 {
        3
    } else {
        frame_interval_type as usize
    }
}

fn collect_bounded<T, I>(seq: I) -> Result<Vec<T, PARAM_MAX>, Error>
where
    I: IntoIterator<Item = T>,
{
    let mut out = Vec::new();
    for v in seq {
        if out.push(v).is_err() {
            return Err(Error::TooMany);
        }
    }
    Ok(out)
}
