//! Binary wire protocol for node-to-node communication (§6).
//!
//! A [`Frame`] is a length-delimited byte frame; a [`Packet`] is one of the
//! six packet classes, tagged with a [`PacketHeader`] and serialized with
//! `postcard`. Depends only on `scada-types` — no kernel, no device, no IO.

mod error;
mod frame;
mod packet;

pub use error::WireError;
pub use frame::{Frame, FRAME_HEADER_SIZE, MAX_FRAME_LEN};
pub use packet::{
    CoordCmdMsg, MgmtMsg, Packet, PacketHeader, PlcCmdMsg, PlcStatusMsg, RpsStatusMsg, RtuDataMsg,
};

#[cfg(test)]
mod proptests {
    use bytes::BytesMut;
    use proptest::prelude::*;

    use scada_types::{
        FacilityMode, GroupId, MatrixSnapshot, ReactorControlRecord, ReactorSnapshot, Tenths,
        TripName, UnitId,
    };

    use crate::packet::{CoordCmdMsg, MgmtMsg, Packet, PacketHeader, PlcCmdMsg, PlcStatusMsg, RpsStatusMsg, RtuDataMsg};

    fn header_strategy() -> impl Strategy<Value = PacketHeader> {
        (any::<u32>(), any::<u32>()).prop_map(|(sender_id, seq)| PacketHeader { sender_id, seq })
    }

    fn trip_name_strategy() -> impl Strategy<Value = TripName> {
        prop_oneof![
            Just(TripName::DmgCrit),
            Just(TripName::HighTemp),
            Just(TripName::NoCoolant),
            Just(TripName::FullWaste),
            Just(TripName::HeatedCoolantBackup),
            Just(TripName::NoFuel),
            Just(TripName::Fault),
            Just(TripName::Timeout),
            Just(TripName::Manual),
            Just(TripName::Automatic),
            Just(TripName::SysFail),
            Just(TripName::ForceDisabled),
        ]
    }

    fn facility_mode_strategy() -> impl Strategy<Value = FacilityMode> {
        prop_oneof![
            Just(FacilityMode::Inactive),
            Just(FacilityMode::Simple),
            Just(FacilityMode::BurnRate),
            Just(FacilityMode::Charge),
            Just(FacilityMode::GenRate),
            Just(FacilityMode::MatrixFaultIdle),
            Just(FacilityMode::UnitAlarmIdle),
        ]
    }

    fn group_id_strategy() -> impl Strategy<Value = GroupId> {
        (0u8..=4).prop_map(|n| GroupId::from_index(n).unwrap())
    }

    fn packet_strategy() -> impl Strategy<Value = Packet> {
        let mgmt = (
            header_strategy(),
            prop_oneof![Just(MgmtMsg::Establish), Just(MgmtMsg::KeepAlive), Just(MgmtMsg::Close)],
        )
            .prop_map(|(header, body)| Packet::Mgmt { header, body });

        let plc_status = (header_strategy(), any::<u32>(), any::<u32>(), any::<u32>()).prop_map(
            |(header, unit, lim, blades)| Packet::PlcStatus {
                header,
                body: PlcStatusMsg {
                    unit: UnitId::new(unit),
                    snapshot: ReactorSnapshot::idle(),
                    control: ReactorControlRecord::new(Tenths::new(lim), blades),
                },
            },
        );

        let rps_status = (
            header_strategy(),
            any::<u32>(),
            any::<bool>(),
            proptest::option::of(trip_name_strategy()),
            any::<bool>(),
            proptest::collection::vec(trip_name_strategy(), 0..4),
        )
            .prop_map(|(header, unit, tripped, first_trip, manual, active_trips)| Packet::PlcRpsStatus {
                header,
                body: RpsStatusMsg { unit: UnitId::new(unit), tripped, first_trip, manual, active_trips },
            });

        let plc_cmd = (header_strategy(), any::<bool>(), any::<u32>(), any::<bool>()).prop_map(
            |(header, enable, target, ramp)| Packet::PlcCmd {
                header,
                body: PlcCmdMsg::SetBurnRate { enable, target_br10: Tenths::new(target), ramp },
            },
        );

        let rtu_data = (header_strategy(), any::<bool>(), 0.0f64..1e6, 1.0f64..1e6).prop_map(
            |(header, formed, energy, max_energy)| Packet::RtuData {
                header,
                body: RtuDataMsg {
                    matrix: MatrixSnapshot {
                        formed,
                        energy,
                        max_energy,
                        input_rate: 0.0,
                        output_rate: 0.0,
                    },
                    redstone_channels: [false; 16],
                },
            },
        );

        let coord_cmd = (header_strategy(), any::<u32>(), group_id_strategy()).prop_map(
            |(header, unit, group)| Packet::CoordCmd {
                header,
                body: CoordCmdMsg::SetGroup { unit: UnitId::new(unit), group },
            },
        );

        let coord_mode = (header_strategy(), facility_mode_strategy())
            .prop_map(|(header, mode)| Packet::CoordCmd { header, body: CoordCmdMsg::SetMode(mode) });

        prop_oneof![mgmt, plc_status, rps_status, plc_cmd, rtu_data, coord_cmd, coord_mode]
    }

    proptest! {
        #[test]
        fn packet_round_trips_through_frame(packet in packet_strategy()) {
            let frame = packet.to_frame().unwrap();
            let decoded = Packet::from_frame(&frame).unwrap();
            prop_assert_eq!(decoded, packet);
        }

        #[test]
        fn packet_round_trips_through_a_byte_buffer(packet in packet_strategy()) {
            let mut buf = BytesMut::new();
            packet.encode(&mut buf).unwrap();
            let decoded = Packet::decode(&mut buf).unwrap().unwrap();
            prop_assert_eq!(decoded, packet);
            prop_assert!(buf.is_empty());
        }
    }
}
