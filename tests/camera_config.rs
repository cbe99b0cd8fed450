//! Builds the complete USB 3.0 camera configuration — two interfaces,
//! an IAD, the full Video Control chain and a seven-frame uncompressed
//! Video Streaming interface — and checks the composed lengths and byte
//! images against hand-computed values.

use usb_desc_builder::{descriptor, uvc, DescriptorBuilder, Error, Guid, Item};

const CAMERA_TERMINAL_ID: u8 = 0x02;
const STREAMING_TERMINAL_ID: u8 = 0x03;
const PROCESSING_UNIT_ID: u8 = 0x05;
const EXTENSION_UNIT_ID: u8 = 0x06;

const EXTENSION_GUID: Guid = Guid {
    data1: 0x8E90_93EF,
    data2: 0x97EA,
    data3: 0x49E1,
    data4: [0x83, 0x06, 0x9F, 0x6B, 0x69, 0x6A, 0x1A, 0xEE],
};

// YUY2
const FORMAT_GUID: Guid = Guid {
    data1: 0x3259_5559,
    data2: 0x0000,
    data3: 0x0010,
    data4: [0x80, 0x00, 0x00, 0xAA, 0x00, 0x38, 0x9B, 0x71],
};

// width, height, bit rate, frame buffer size, frame interval
const FRAME_SHEET: [(u16, u16, u32, u32, u32); 7] = [
    (640, 480, 0x16E9_0000, 0x0009_6000, 0x0001_F385),
    (640, 240, 0x1678_8000, 0x0004_B000, 0x0000_FEA5),
    (640, 120, 0x159B_4000, 0x0002_5800, 0x0000_846A),
    (1280, 960, 0x34BC_0000, 0x0025_8000, 0x0003_640E),
    (1280, 480, 0x34BC_0000, 0x0012_C000, 0x0001_B207),
    (1280, 240, 0x31CE_0000, 0x0009_6000, 0x0000_E5C7),
    (1280, 120, 0x2E24_8000, 0x0004_B000, 0x0000_7C02),
];

struct Scenario {
    device: Item,
    qualifier: Item,
    config: Item,
    vc_header: Item,
    vs_header: Item,
    strings: Vec<Item>,
    frames: Vec<Item>,
}

fn build_scenario(bldr: &mut DescriptorBuilder) -> Scenario {
    // Strings first; the language table is architected to be index 0.
    let mut strings = vec![bldr.language_ids(&[0x0409]).unwrap()];
    for s in [
        "Leap Motion",
        "MH00007",
        "Meadow Hawk",
        "Leap Motion Test Device",
        "Leap Motion Test Config",
    ] {
        strings.push(bldr.string(s).unwrap());
    }

    let device = bldr
        .device(&descriptor::Device {
            bcd_usb: 0x0300,
            b_device_class: 0xEF, // Miscellaneous
            b_device_sub_class: 0x02,
            b_device_protocol: 0x01, // IAD
            id_vendor: 0xF182,
            id_product: 0x0004,
            bcd_device: 0x0108,
            i_manufacturer: strings[1].index(),
            i_product: strings[3].index(),
            i_serial_number: strings[2].index(),
            b_num_configurations: 1,
        })
        .unwrap();

    let qualifier = bldr
        .device_qualifier(&descriptor::DeviceQualifier {
            bcd_usb: 0x0200,
            b_device_class: 0xEF,
            b_device_sub_class: 0x02,
            b_device_protocol: 0x01,
            b_num_configurations: 1,
        })
        .unwrap();

    let mut config = bldr
        .configuration(&descriptor::Configuration {
            b_num_interfaces: 2,
            b_configuration_value: 1,
            i_configuration: strings[5].index(),
            bm_attributes: 0x80,
            b_max_power: 100,
        })
        .unwrap();

    let iad = bldr
        .interface_association(&descriptor::InterfaceAssociation {
            b_first_interface: 0,
            b_interface_count: 2,
            b_function_class: uvc::CC_VIDEO,
            b_function_sub_class: uvc::SC_VIDEO_INTERFACE_COLLECTION,
            b_function_protocol: uvc::PC_PROTOCOL_UNDEFINED,
            i_function: 0,
        })
        .unwrap();

    // Interface 0: Video Control.
    let vc_if = bldr
        .vc_interface(&uvc::VcInterface {
            b_interface_number: 0,
            b_alternate_setting: 0,
            b_num_endpoints: 1,
            i_interface: 0,
        })
        .unwrap();

    let mut vc_header = bldr.vc_header(0x0000_03E8, &[1]).unwrap();

    let camera = bldr
        .camera_terminal(&uvc::CameraTerminal {
            b_terminal_id: CAMERA_TERMINAL_ID,
            b_assoc_terminal: 0,
            i_terminal: 0,
            w_objective_focal_length_min: 0,
            w_objective_focal_length_max: 0,
            w_ocular_focal_length: 0,
            bm_controls: 0x0000_0228,
        })
        .unwrap();

    let processing = bldr
        .processing_unit(&uvc::ProcessingUnit {
            b_unit_id: PROCESSING_UNIT_ID,
            b_source_id: CAMERA_TERMINAL_ID,
            w_max_multiplier: 0,
            bm_controls: 0x0000_027B,
            i_processing: 0,
            bm_video_standards: 0,
        })
        .unwrap();

    let extension = bldr
        .extension_unit(
            &uvc::ExtensionUnit {
                b_unit_id: EXTENSION_UNIT_ID,
                guid_extension_code: EXTENSION_GUID,
                b_num_controls: 0,
                bm_controls: &[0x01, 0x00, 0x00],
                i_extension: 0,
            },
            &[PROCESSING_UNIT_ID],
        )
        .unwrap();

    let output = bldr
        .streaming_out_terminal(&uvc::StreamingOutTerminal {
            b_terminal_id: STREAMING_TERMINAL_ID,
            b_assoc_terminal: 0,
            b_source_id: EXTENSION_UNIT_ID,
            i_terminal: 0,
        })
        .unwrap();

    let vc_ep = bldr
        .endpoint(&descriptor::Endpoint {
            b_endpoint_address: 0x82,
            bm_attributes: 0x03,
            w_max_packet_size: 1024,
            b_interval: 1,
        })
        .unwrap();

    let vc_companion = bldr
        .ss_ep_companion(&descriptor::SsEpCompanion {
            b_max_burst: 0,
            bm_attributes: 0,
            w_bytes_per_interval: 1024,
        })
        .unwrap();

    let interrupt_ep = bldr.vc_interrupt_endpoint(64).unwrap();

    // Interface 1: Video Streaming.
    let vs_if = bldr
        .vs_interface(&uvc::VsInterface {
            b_interface_number: 1,
            b_alternate_setting: 0,
            b_num_endpoints: 1,
            i_interface: 0,
        })
        .unwrap();

    let mut vs_header = bldr
        .vs_input_header(
            &uvc::VsInputHeader {
                b_endpoint_address: 0x83,
                bm_info: 0,
                b_terminal_link: STREAMING_TERMINAL_ID,
                b_still_capture_method: 0,
                b_trigger_support: 0,
                b_trigger_usage: 0,
            },
            &[0],
        )
        .unwrap();

    let format = bldr
        .format_uncompressed(&uvc::FormatUncompressed {
            b_format_index: 1,
            b_num_frame_descriptors: FRAME_SHEET.len() as u8,
            guid_format: FORMAT_GUID,
            b_bits_per_pixel: 16,
            b_default_frame_index: 2,
            b_aspect_ratio_x: 0,
            b_aspect_ratio_y: 0,
            bm_interlace_flags: 0,
            b_copy_protect: 0,
        })
        .unwrap();

    let mut frames = Vec::new();
    for (i, &(width, height, bit_rate, buffer_size, interval)) in FRAME_SHEET.iter().enumerate() {
        let frame = bldr
            .frame_uncompressed(
                &uvc::FrameUncompressed {
                    b_frame_index: (i + 1) as u8,
                    bm_capabilities: 0,
                    w_width: width,
                    w_height: height,
                    dw_min_bit_rate: bit_rate,
                    dw_max_bit_rate: bit_rate,
                    dw_max_video_frame_buffer_size: buffer_size,
                    dw_default_frame_interval: interval,
                    b_frame_interval_type: 1,
                },
                &[interval],
            )
            .unwrap();
        frames.push(frame);
    }

    let vs_ep = bldr
        .endpoint(&descriptor::Endpoint {
            b_endpoint_address: 0x83,
            bm_attributes: 0x02,
            w_max_packet_size: 1024,
            b_interval: 1,
        })
        .unwrap();

    let vs_companion = bldr
        .ss_ep_companion(&descriptor::SsEpCompanion {
            b_max_burst: 0x0F,
            bm_attributes: 0,
            w_bytes_per_interval: 0,
        })
        .unwrap();

    // All bytes are in place; wire up the hierarchy bottom-up so lengths
    // percolate upward.
    bldr.add_children(&mut vs_header, &[&format]).unwrap();
    for frame in &frames {
        bldr.add_children(&mut vs_header, &[frame]).unwrap();
    }
    bldr.add_children(&mut vc_header, &[&camera, &processing, &extension, &output])
        .unwrap();
    bldr.add_children(&mut config, &[&iad, &vc_if, &vc_header, &vs_if, &vs_header])
        .unwrap();
    bldr.add_children(
        &mut config,
        &[&interrupt_ep, &vc_ep, &vc_companion, &vs_ep, &vs_companion],
    )
    .unwrap();

    Scenario {
        device,
        qualifier,
        config,
        vc_header,
        vs_header,
        strings,
        frames,
    }
}

#[test]
fn full_configuration_composes_to_hand_computed_lengths() {
    let mut buf = [0u8; 1024];
    let mut bldr = DescriptorBuilder::new(&mut buf);
    let s = build_scenario(&mut bldr);

    assert_eq!(s.device.size(), 18);
    assert_eq!(s.qualifier.size(), 10);

    // VC header: 13 own + camera 18 + processing 12 + extension 28 +
    // output terminal 9.
    assert_eq!(bldr.total_length(&s.vc_header), 80);

    // VS header: 14 own + format 27 + 7 frames of 30.
    assert_eq!(bldr.total_length(&s.vs_header), 251);

    // Configuration: 9 own + IAD 8 + interfaces 9 + 9 + both header
    // trees + interrupt EP 5 + two (endpoint 7 + companion 6) pairs.
    assert_eq!(bldr.total_length(&s.config), 397);

    // The flat region really spans that many bytes of records.
    let emitted = bldr.emitted(&s.config).unwrap();
    assert_eq!(emitted.len(), 397);
    assert_eq!(descriptor::Descriptors::new(emitted).count(), 23);
    let walked: usize = descriptor::Descriptors::new(emitted)
        .map(|rec| rec.len())
        .sum();
    assert_eq!(walked, 397);
}

#[test]
fn device_and_string_byte_images() {
    let mut buf = [0u8; 1024];
    let mut bldr = DescriptorBuilder::new(&mut buf);
    let s = build_scenario(&mut bldr);

    assert_eq!(
        bldr.descriptor_bytes(&s.device).unwrap(),
        &[
            18, 0x01, 0x00, 0x03, 0xEF, 0x02, 0x01, 9, 0x82, 0xF1, 0x04, 0x00, 0x08, 0x01, 1, 3,
            2, 1
        ]
    );

    // Language table, then "Leap Motion" at index 1: 2 + 11 * 2 bytes.
    assert_eq!(
        bldr.descriptor_bytes(&s.strings[0]).unwrap(),
        &[4, 0x03, 0x09, 0x04]
    );
    let manufacturer = bldr.descriptor_bytes(&s.strings[1]).unwrap();
    assert_eq!(manufacturer.len(), 24);
    assert_eq!(s.strings[1].index(), 1);
    assert_eq!(&manufacturer[..6], &[24, 0x03, b'L', 0x00, b'e', 0x00]);

    // First frame descriptor, byte for byte.
    assert_eq!(
        bldr.descriptor_bytes(&s.frames[0]).unwrap(),
        &[
            30, 0x24, 0x05, 1, 0, // header, index, capabilities
            0x80, 0x02, 0xE0, 0x01, // 640 x 480
            0x00, 0x00, 0xE9, 0x16, // min bit rate
            0x00, 0x00, 0xE9, 0x16, // max bit rate
            0x00, 0x60, 0x09, 0x00, // frame buffer size
            0x85, 0xF3, 0x01, 0x00, // default interval
            1, // one discrete interval
            0x85, 0xF3, 0x01, 0x00,
        ]
    );

    // The backpatched wTotalLength field itself, little-endian.
    let config_bytes = bldr.descriptor_bytes(&s.config).unwrap();
    assert_eq!(&config_bytes[2..4], &[0x8D, 0x01]); // 397
}

#[test]
fn dry_run_accounts_identically() {
    let mut buf = [0u8; 1024];
    let mut attached = DescriptorBuilder::new(&mut buf);
    let a = build_scenario(&mut attached);

    let mut dry = DescriptorBuilder::dry_run();
    let d = build_scenario(&mut dry);

    assert_eq!(attached.used(), dry.used());
    assert_eq!(attached.total_length(&a.config), dry.total_length(&d.config));
    assert_eq!(
        attached.total_length(&a.vs_header),
        dry.total_length(&d.vs_header)
    );
    assert_eq!(a.device.size(), d.device.size());
    assert!(dry.descriptor_bytes(&d.device).is_none());
    assert!(dry.is_dry_run());
}

#[test]
fn bos_composes_device_capabilities() {
    let mut buf = [0u8; 64];
    let mut bldr = DescriptorBuilder::new(&mut buf);
    let mut bos = bldr.bos(2).unwrap();
    // USB 2.0 extension (LPM) and a SuperSpeed capability.
    let usb2ext = bldr.device_capability(0x02, &[0x06, 0x00, 0x00, 0x00]).unwrap();
    let ss = bldr
        .device_capability(0x03, &[0x00, 0x0E, 0x00, 0x01, 0x0A, 0xFF, 0x07])
        .unwrap();
    bldr.add_children(&mut bos, &[&usb2ext, &ss]).unwrap();

    assert_eq!(bldr.total_length(&bos), 5 + 7 + 10);
    let bytes = bldr.descriptor_bytes(&bos).unwrap();
    assert_eq!(bytes[4], 2); // bNumDeviceCaps
    assert_eq!(&bytes[2..4], &[22, 0]);
}

#[test]
fn exact_fit_succeeds_and_one_byte_short_fails() {
    let mut exact = [0u8; 18 + 7];
    let mut bldr = DescriptorBuilder::new(&mut exact);
    bldr.device(&descriptor::Device::default()).unwrap();
    bldr.endpoint(&descriptor::Endpoint::default()).unwrap();
    assert_eq!(bldr.remaining(), Some(0));

    let mut short = [0u8; 18 + 6];
    let mut bldr = DescriptorBuilder::new(&mut short);
    bldr.device(&descriptor::Device::default()).unwrap();
    let before = bldr.used();
    assert_eq!(
        bldr.endpoint(&descriptor::Endpoint::default()).unwrap_err(),
        Error::NoSpace
    );
    assert_eq!(bldr.used(), before);
}
