use bitstream_io::{BitWrite, BitWriter, Endianness};

use super::{
    ParseError,
    common::{PacketComponent, labels_to_name, name_to_labels, read_labels, write_labels},
    enums::{DNSResourceClass, DNSResourceType},
};
use crate::wire::WireCodec;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DNSQuestion {
    pub labels: Vec<String>,
    pub qtype: DNSResourceType,
    pub qclass: DNSResourceClass,
}

impl DNSQuestion {
    pub fn new(name: &str, qtype: DNSResourceType) -> Self {
        Self {
            labels: name_to_labels(name),
            qtype,
            qclass: DNSResourceClass::IN,
        }
    }

    pub fn name(&self) -> String {
        labels_to_name(&self.labels)
    }
}

impl PacketComponent for DNSQuestion {
    fn write<E: Endianness>(
        &self,
        writer: &mut BitWriter<&mut Vec<u8>, E>,
    ) -> Result<(), ParseError> {
        write_labels(writer, &self.labels)?;
        writer.write_var::<u16>(16, self.qtype.into())?;
        writer.write_var::<u16>(16, self.qclass.into())?;
        Ok(())
    }

    fn read(&mut self, codec: &mut WireCodec<'_>) -> Result<(), ParseError> {
        let labels = read_labels(codec)?;
        let qtype = codec.read_u16()?.into();
        let qclass = codec.read_u16()?.into();
        *self = DNSQuestion {
            labels,
            qtype,
            qclass,
        };
        Ok(())
    }
}
