use bytes::{Bytes, BytesMut};
use serde::{Deserialize, Serialize};

use scada_types::{
    FacilityMode, GroupId, MatrixSnapshot, ReactorControlRecord, ReactorSnapshot, Tenths, TripName,
    UnitId,
};

use crate::error::WireError;
use crate::frame::Frame;

/// Fields every packet class carries (§6: "protocol id, sender id, sequence
/// number, type tag, and a payload table" — the type tag is the `Packet`
/// variant itself, so the header only needs the rest).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PacketHeader {
    pub sender_id: u32,
    pub seq: u32,
}

impl PacketHeader {
    pub fn new(sender_id: u32, seq: u32) -> Self {
        Self { sender_id, seq }
    }
}

/// Session lifecycle messages: establish, keep-alive, close.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MgmtMsg {
    Establish,
    KeepAlive,
    Close,
}

/// Full reactor telemetry, broadcast every 4 ticks (§4.2 status cadence).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlcStatusMsg {
    pub unit: UnitId,
    pub snapshot: ReactorSnapshot,
    pub control: ReactorControlRecord,
}

/// RPS flag vector (§4.1 `status()`), sent on latch and on the final
/// pre-close status exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpsStatusMsg {
    pub unit: UnitId,
    pub tripped: bool,
    pub first_trip: Option<TripName>,
    pub manual: bool,
    /// Every trip predicate that read true on the scan this status reflects.
    pub active_trips: Vec<TripName>,
}

/// Supervisor → PLC setpoint and control commands (§4.2 setpoint contract,
/// §4.1 `reset()`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlcCmdMsg {
    SetBurnRate { enable: bool, target_br10: Tenths, ramp: bool },
    /// `automatic` distinguishes a supervisor-initiated auto-SCRAM from an
    /// operator-initiated one, so the PLC can feed `RpsInputs.automatic`
    /// from the command that actually triggered it.
    Scram { automatic: bool },
    Reset,
}

/// Induction-matrix and redstone-backplane telemetry from an RTU peer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RtuDataMsg {
    pub matrix: MatrixSnapshot,
    pub redstone_channels: [bool; 16],
}

/// Coordinator → supervisor operator commands (§6.3 mode/target/limit/ack).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum CoordCmdMsg {
    SetMode(FacilityMode),
    SetTarget(f64),
    SetGroup { unit: UnitId, group: GroupId },
    SetLimit { unit: UnitId, lim_br10: Tenths },
    Ack { seq: u32 },
}

/// The six packet classes from §6, each tagged with a shared
/// [`PacketHeader`] and serialized with `postcard`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Packet {
    Mgmt { header: PacketHeader, body: MgmtMsg },
    PlcStatus { header: PacketHeader, body: PlcStatusMsg },
    PlcRpsStatus { header: PacketHeader, body: RpsStatusMsg },
    PlcCmd { header: PacketHeader, body: PlcCmdMsg },
    RtuData { header: PacketHeader, body: RtuDataMsg },
    CoordCmd { header: PacketHeader, body: CoordCmdMsg },
}

impl Packet {
    pub fn header(&self) -> PacketHeader {
        match self {
            Packet::Mgmt { header, .. }
            | Packet::PlcStatus { header, .. }
            | Packet::PlcRpsStatus { header, .. }
            | Packet::PlcCmd { header, .. }
            | Packet::RtuData { header, .. }
            | Packet::CoordCmd { header, .. } => *header,
        }
    }

    /// Encodes to a postcard payload and wraps it in a length-delimited frame.
    pub fn to_frame(&self) -> Result<Frame, WireError> {
        let payload = postcard::to_allocvec(self).map_err(WireError::Encode)?;
        Ok(Frame::new(Bytes::from(payload)))
    }

    pub fn from_frame(frame: &Frame) -> Result<Packet, WireError> {
        postcard::from_bytes(&frame.payload).map_err(WireError::Decode)
    }

    /// Convenience: encode straight onto a connection's write buffer.
    pub fn encode(&self, out: &mut BytesMut) -> Result<(), WireError> {
        self.to_frame()?.encode(out);
        Ok(())
    }

    /// Convenience: decode the next complete packet off a connection's read
    /// buffer, if one is available.
    pub fn decode(buf: &mut BytesMut) -> Result<Option<Packet>, WireError> {
        match Frame::decode(buf)? {
            Some(frame) => Ok(Some(Packet::from_frame(&frame)?)),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_packets() -> Vec<Packet> {
        let header = PacketHeader::new(7, 42);
        vec![
            Packet::Mgmt { header, body: MgmtMsg::KeepAlive },
            Packet::PlcStatus {
                header,
                body: PlcStatusMsg {
                    unit: UnitId::new(1),
                    snapshot: ReactorSnapshot::idle(),
                    control: ReactorControlRecord::new(Tenths::new(500), 12),
                },
            },
            Packet::PlcRpsStatus {
                header,
                body: RpsStatusMsg {
                    unit: UnitId::new(1),
                    tripped: true,
                    first_trip: Some(TripName::HighTemp),
                    manual: false,
                    active_trips: vec![TripName::HighTemp, TripName::FullWaste],
                },
            },
            Packet::PlcCmd {
                header,
                body: PlcCmdMsg::SetBurnRate {
                    enable: true,
                    target_br10: Tenths::new(100),
                    ramp: true,
                },
            },
            Packet::PlcCmd { header, body: PlcCmdMsg::Scram { automatic: true } },
            Packet::RtuData {
                header,
                body: RtuDataMsg {
                    matrix: MatrixSnapshot {
                        formed: true,
                        energy: 1000.0,
                        max_energy: 2000.0,
                        input_rate: 10.0,
                        output_rate: 5.0,
                    },
                    redstone_channels: [false; 16],
                },
            },
            Packet::CoordCmd {
                header,
                body: CoordCmdMsg::SetGroup { unit: UnitId::new(3), group: GroupId::Group(2) },
            },
        ]
    }

    #[test]
    fn packets_round_trip_through_frame() {
        for packet in sample_packets() {
            let frame = packet.to_frame().unwrap();
            let decoded = Packet::from_frame(&frame).unwrap();
            assert_eq!(decoded, packet);
        }
    }

    #[test]
    fn encode_decode_through_a_shared_buffer() {
        let mut buf = BytesMut::new();
        for packet in sample_packets() {
            packet.encode(&mut buf).unwrap();
        }

        let mut decoded = Vec::new();
        while let Some(packet) = Packet::decode(&mut buf).unwrap() {
            decoded.push(packet);
        }
        assert_eq!(decoded, sample_packets());
    }

    #[test]
    fn malformed_payload_is_a_decode_error_not_a_panic() {
        let mut buf = BytesMut::new();
        Frame::new(Bytes::from_static(b"not postcard")).encode(&mut buf);
        assert!(Packet::decode(&mut buf).is_err());
    }
}
