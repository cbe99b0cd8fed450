//! Builds a small USB 3.0 camera configuration and prints every
//! top-level descriptor as a C byte-array literal, the form firmware
//! images embed.
//!
//! Run with `cargo run --example emit-config`.

use usb_desc_builder::{descriptor, uvc, DescriptorBuilder, Guid, Item};

fn emit(name: &str, bldr: &DescriptorBuilder, item: &Item) {
    let bytes = bldr.emitted(item).expect("demo always attaches a buffer");
    print!("uint8_t {}[] = {{  // length {}", name, bytes.len());
    for (i, b) in bytes.iter().enumerate() {
        if i > 0 {
            print!(",");
        }
        if i % 8 == 0 {
            print!("\n\t");
        } else {
            print!(" ");
        }
        print!("0x{:02X}", b);
    }
    println!("}};");
}

fn main() {
    let mut buf = [0u8; 1024];
    let mut bldr = DescriptorBuilder::new(&mut buf);

    let languages = bldr.language_ids(&[0x0409]).unwrap();
    let manufacturer = bldr.string("Leap Motion").unwrap();
    let product = bldr.string("Meadow Hawk").unwrap();

    let device = bldr
        .device(&descriptor::Device {
            bcd_usb: 0x0300,
            b_device_class: 0xEF,
            b_device_sub_class: 0x02,
            b_device_protocol: 0x01,
            id_vendor: 0xF182,
            id_product: 0x0004,
            bcd_device: 0x0108,
            i_manufacturer: manufacturer.index(),
            i_product: product.index(),
            i_serial_number: 0,
            b_num_configurations: 1,
        })
        .unwrap();

    let mut config = bldr
        .configuration(&descriptor::Configuration {
            b_num_interfaces: 2,
            b_configuration_value: 1,
            i_configuration: 0,
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

    let vc_if = bldr
        .vc_interface(&uvc::VcInterface {
            b_interface_number: 0,
            b_num_endpoints: 1,
            ..Default::default()
        })
        .unwrap();

    let mut vc_header = bldr.vc_header(1_000, &[1]).unwrap();
    let camera = bldr
        .camera_terminal(&uvc::CameraTerminal {
            b_terminal_id: 1,
            bm_controls: 0x0000_0228,
            ..Default::default()
        })
        .unwrap();
    let output = bldr
        .streaming_out_terminal(&uvc::StreamingOutTerminal {
            b_terminal_id: 2,
            b_source_id: 1,
            ..Default::default()
        })
        .unwrap();

    let vs_if = bldr
        .vs_interface(&uvc::VsInterface {
            b_interface_number: 1,
            b_num_endpoints: 1,
            ..Default::default()
        })
        .unwrap();

    let mut vs_header = bldr
        .vs_input_header(
            &uvc::VsInputHeader {
                b_endpoint_address: 0x83,
                b_terminal_link: 2,
                ..Default::default()
            },
            &[0],
        )
        .unwrap();

    let format = bldr
        .format_uncompressed(&uvc::FormatUncompressed {
            b_format_index: 1,
            b_num_frame_descriptors: 1,
            guid_format: Guid {
                data1: 0x3259_5559, // YUY2
                data2: 0x0000,
                data3: 0x0010,
                data4: [0x80, 0x00, 0x00, 0xAA, 0x00, 0x38, 0x9B, 0x71],
            },
            b_bits_per_pixel: 16,
            b_default_frame_index: 1,
            ..Default::default()
        })
        .unwrap();

    let frame = bldr
        .frame_uncompressed(
            &uvc::FrameUncompressed {
                b_frame_index: 1,
                w_width: 640,
                w_height: 480,
                dw_min_bit_rate: 0x16E9_0000,
                dw_max_bit_rate: 0x16E9_0000,
                dw_max_video_frame_buffer_size: 0x0009_6000,
                dw_default_frame_interval: 0x0001_F385,
                b_frame_interval_type: 1,
                ..Default::default()
            },
            &[0x0001_F385],
        )
        .unwrap();

    let vs_ep = bldr
        .endpoint(&descriptor::Endpoint {
            b_endpoint_address: 0x83,
            bm_attributes: 0x02,
            w_max_packet_size: 1024,
            b_interval: 1,
        })
        .unwrap();

    bldr.add_children(&mut vc_header, &[&camera, &output]).unwrap();
    bldr.add_children(&mut vs_header, &[&format, &frame]).unwrap();
    bldr.add_children(&mut config, &[&iad, &vc_if, &vc_header, &vs_if, &vs_header, &vs_ep])
        .unwrap();

    emit("deviceDesc", &bldr, &device);
    emit("configurationDesc", &bldr, &config);
    emit("stringDesc000", &bldr, &languages);
    emit("stringDesc001", &bldr, &manufacturer);
    emit("stringDesc002", &bldr, &product);
}
