//! Cross-kind wire integration tests
//!
//! Pack a message, corrupt or relay it, unpack on the "peer" side, and check
//! the reconstructed entity. Exercises the full envelope + body path the way
//! a transport would.

use igtfusion::frame::validation::{
    validate, ValidationConfig, ValidationRequirements, FIELD_PROBE_POSITION,
    FIELD_PROBE_ROTATION, FIELD_TEMPLATE_POSITION,
};
use igtfusion::frame::video::{ScalarType, VideoFrame};
use igtfusion::frame::{xml, FieldStatus, TrackedFrame, TransformName};
use igtfusion::protocol::types::{
    ImageMessage, PositionMessage, TrackedFrameMessage, TrackingDataElement,
    TrackingDataMessage, UsMessage,
};
use igtfusion::protocol::{Header, TransformMessage, WireMessage};
use igtfusion::FusionError;

fn patterned(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i * 7 % 256) as u8).collect()
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

#[test]
fn image_message_round_trips_byte_for_byte() {
    let pixels = patterned(64 * 48);
    let image = ImageMessage::new(ScalarType::Uint8, [64, 48, 1], pixels.clone()).unwrap();
    let msg = WireMessage::new(image, "VideoDevice")
        .unwrap()
        .with_timestamp(10.5);

    let packed = msg.pack().unwrap();
    let received = WireMessage::<ImageMessage>::unpack(&packed).unwrap();

    assert_eq!(received.content.dimensions, [64, 48, 1]);
    assert_eq!(received.content.scalar_type, ScalarType::Uint8);
    assert_eq!(received.content.num_components, 1);
    assert_eq!(received.content.data, pixels);
    assert!((received.timestamp() - 10.5).abs() < 1e-6);
}

#[test]
fn corrupting_any_body_byte_fails_integrity_check() {
    let image = ImageMessage::new(ScalarType::Uint8, [16, 16, 1], patterned(256)).unwrap();
    let msg = WireMessage::new(image, "VideoDevice").unwrap();
    let packed = msg.pack().unwrap();

    for offset in [0usize, 57, 100, 255] {
        let mut corrupted = packed.clone();
        corrupted[Header::SIZE + offset] ^= 0x01;

        let result = WireMessage::<ImageMessage>::unpack(&corrupted);
        assert!(
            matches!(result, Err(FusionError::CrcMismatch { .. })),
            "body byte {offset} corruption must fail the CRC"
        );
    }
}

#[test]
fn tracking_data_round_trips_three_tools() {
    let make = |name: &str, x: f32| {
        TrackingDataElement::new(
            name,
            [
                [1.0, 0.0, 0.0, x],
                [0.0, 1.0, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
            ],
        )
    };
    let tdata = TrackingDataMessage::new(vec![
        make("Stylus", 10.0),
        make("Probe", 20.0),
        make("Needle", 30.0),
    ]);

    let packed = WireMessage::new(tdata.clone(), "Tracker")
        .unwrap()
        .pack()
        .unwrap();
    let received = WireMessage::<TrackingDataMessage>::unpack(&packed).unwrap();

    assert_eq!(received.content.len(), 3);
    for element in &tdata.elements {
        assert!(received.content.elements.contains(element));
    }
}

#[test]
fn position_unpack_preserves_translation_exactly() {
    let position = PositionMessage::with_quaternion(
        [101.25, -40.5, 612.0],
        [0.0, 0.0, std::f32::consts::FRAC_1_SQRT_2, std::f32::consts::FRAC_1_SQRT_2],
    );
    let packed = WireMessage::new(position, "StylusToTracker")
        .unwrap()
        .pack()
        .unwrap();

    let received = WireMessage::<PositionMessage>::unpack(&packed).unwrap();
    let matrix = received.content.to_matrix();
    assert_eq!(matrix[3], 101.25);
    assert_eq!(matrix[7], -40.5);
    assert_eq!(matrix[11], 612.0);
    // 90 deg about z
    assert!((matrix[4] - 1.0).abs() < 1e-6);
    assert!((matrix[1] + 1.0).abs() < 1e-6);
    assert_eq!(
        received.header.device_name.as_str().unwrap(),
        "StylusToTracker"
    );
}

#[test]
fn composite_frame_survives_wire_and_xml() {
    let mut frame = TrackedFrame::new();
    frame.set_timestamp(77.125);
    frame.set_image_data(
        VideoFrame::from_data([32, 24, 1], ScalarType::Uint8, 1, patterned(768)).unwrap(),
    );
    let probe = TransformName::new("Probe", "Tracker").unwrap();
    let mut pose = igtfusion::frame::identity_matrix();
    pose[3] = 5.5;
    frame.set_transform(&probe, &pose).unwrap();
    frame.set_transform_status(&probe, FieldStatus::Ok).unwrap();
    frame.set_custom_field("FrameNumber", "12").unwrap();

    // wire hop
    let composite = TrackedFrameMessage::from_tracked_frame(&frame, None).unwrap();
    let packed = WireMessage::new(composite, "VideoDevice")
        .unwrap()
        .with_timestamp(frame.timestamp())
        .pack()
        .unwrap();
    let received = WireMessage::<TrackedFrameMessage>::unpack(&packed).unwrap();
    let over_wire = received
        .content
        .to_tracked_frame(received.timestamp(), None)
        .unwrap();

    assert!((over_wire.timestamp() - 77.125).abs() < 1e-6);
    assert_eq!(over_wire.image_data().data(), frame.image_data().data());
    assert_eq!(over_wire.transform(&probe).unwrap(), pose);

    // xml hop of the same frame (dictionary + timestamp scope)
    let restored = xml::from_xml(&xml::to_xml(&frame, &[]).unwrap()).unwrap();
    assert_eq!(restored.timestamp(), frame.timestamp());
    assert_eq!(restored.field_names(), frame.field_names());
    assert_eq!(restored.transform(&probe).unwrap(), pose);
}

#[test]
fn us_frame_carries_only_ultrasound_fields() {
    let mut frame = TrackedFrame::new();
    frame.set_timestamp(9.0);
    frame.set_image_data(VideoFrame::allocate([8, 8, 1], ScalarType::Uint8, 1).unwrap());
    frame.set_custom_field("SoundVelocity", "1540").unwrap();
    frame.set_custom_field("OperatorNote", "sweep 3").unwrap();

    let packed = WireMessage::new(UsMessage::from_tracked_frame(&frame).unwrap(), "UsDevice")
        .unwrap()
        .with_timestamp(9.0)
        .pack()
        .unwrap();
    let received = WireMessage::<UsMessage>::unpack(&packed).unwrap();
    let rebuilt = received.content.to_tracked_frame(received.timestamp()).unwrap();

    assert_eq!(rebuilt.custom_field("SoundVelocity"), Some("1540"));
    assert_eq!(rebuilt.custom_field("OperatorNote"), None);
}

#[test]
fn validator_gates_received_frames() {
    init_tracing();
    // a receiving side appends unpacked frames to a history guarded by the
    // sequence validator
    let mut history: Vec<TrackedFrame> = Vec::new();
    let config = ValidationConfig {
        requirements: ValidationRequirements::UNIQUE_TIMESTAMP
            | ValidationRequirements::CHANGED_ENCODER_POSITION,
        min_translation_mm: 2.0,
        min_angle_deg: 1.0,
        ..ValidationConfig::default()
    };

    let make = |timestamp: f64, probe_pos: f64| {
        let mut frame = TrackedFrame::new();
        frame.set_timestamp(timestamp);
        frame
            .set_custom_field(FIELD_PROBE_POSITION, probe_pos.to_string())
            .unwrap();
        frame
            .set_custom_field(FIELD_PROBE_ROTATION, "0")
            .unwrap();
        frame
            .set_custom_field(FIELD_TEMPLATE_POSITION, "0")
            .unwrap();
        frame
    };

    for (timestamp, probe_pos, expected) in [
        (5.0, 0.0, true),    // first frame
        (5.0, 10.0, false),  // duplicate timestamp
        (5.0001, 1.0, false), // moved only 1 mm
        (5.0001, 3.0, true), // moved 3 mm
    ] {
        let candidate = make(timestamp, probe_pos);
        let accepted = validate(&candidate, &history, &config);
        assert_eq!(accepted, expected, "timestamp {timestamp}, pos {probe_pos}");
        if accepted {
            history.push(candidate);
        }
    }
    assert_eq!(history.len(), 2);
}

#[test]
fn transform_name_survives_device_name_slot() {
    let name = TransformName::new("Image", "Reference").unwrap();
    let transform = TransformMessage::identity();
    let packed = WireMessage::new(transform, &name.to_string())
        .unwrap()
        .pack()
        .unwrap();

    let received = WireMessage::<TransformMessage>::unpack(&packed).unwrap();
    let raw = received.header.device_name.as_str().unwrap();
    let parsed = TransformName::parse(&format!("{raw}Transform")).unwrap();
    assert_eq!(parsed, name);
}
