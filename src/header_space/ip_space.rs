use crate::error::ModelError;
use crate::header_space::{HeaderField, PacketVariables};
use crate::model::IpSpace;
use biodivine_lib_bdd::Bdd;

impl PacketVariables {
    /// Convert an [`IpSpace`] into a predicate constraining the given IP field.
    ///
    /// # Errors
    ///
    /// Fails with [`ModelError::InvalidPrefixLength`] or [`ModelError::InvalidRange`] when the
    /// IP space is malformed.
    pub fn mk_ip_space(&self, field: HeaderField, space: &IpSpace) -> Result<Bdd, ModelError> {
        debug_assert!(matches!(field, HeaderField::DstIp | HeaderField::SrcIp));
        Ok(match space {
            IpSpace::Universe => self.mk_true(),
            IpSpace::Empty => self.mk_false(),
            IpSpace::Ip(ip) => self.mk_value(field, u64::from(u32::from(*ip))),
            IpSpace::Prefix { ip, length } => {
                if *length > 32 {
                    return Err(ModelError::InvalidPrefixLength(*length));
                }
                self.mk_prefix(field, u64::from(u32::from(*ip)), u16::from(*length))
            }
            IpSpace::Range { first, last } => {
                let (first, last) = (u32::from(*first), u32::from(*last));
                if first > last {
                    return Err(ModelError::InvalidRange {
                        field,
                        first: u64::from(first),
                        last: u64::from(last),
                    });
                }
                self.mk_range(field, u64::from(first), u64::from(last))
            }
            IpSpace::Union(spaces) => {
                let mut result = self.mk_false();
                for space in spaces {
                    result = result.or(&self.mk_ip_space(field, space)?);
                }
                result
            }
            IpSpace::Difference { include, exclude } => {
                let include = self.mk_ip_space(field, include)?;
                include.and_not(&self.mk_ip_space(field, exclude)?)
            }
        })
    }
}
