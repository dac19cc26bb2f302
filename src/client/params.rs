use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// Conversion of a typed value into the exact string the camera expects in
/// a query parameter.
///
/// Integers keep their decimal form and floats use the shortest `Display`
/// form (`180` stays `180`, `2.0` becomes `2`), which is what the vendor
/// tooling sends.
pub(crate) trait NexusParam {
    fn to_param(self) -> String;
}

macro_rules! simple_nexus_param {
    ($($ty:ty),*) => {
        $(
            impl NexusParam for $ty {
                fn to_param(self) -> String {
                    self.to_string()
                }
            }
        )*
    };
}

simple_nexus_param!(u8, u16, i32, u32, i64, f64);

impl NexusParam for String {
    fn to_param(self) -> String {
        self
    }
}

impl NexusParam for &str {
    fn to_param(self) -> String {
        self.to_owned()
    }
}

/// Builds an ad-hoc serializable struct holding the query parameters of one
/// action, field names spelled exactly as the wire expects them.
///
/// Declaration order is wire order, so the serialized pairs land between the
/// `action` parameter and the session trailer.
macro_rules! action_params {
    ($($key:ident: $value:expr),* $(,)?) => {{
        #[derive(Debug, serde::Serialize)]
        #[allow(non_snake_case)]
        struct Params {
            $($key: String,)*
        }

        Params {
            $($key: $crate::client::params::NexusParam::to_param($value),)*
        }
    }};
}
pub(crate) use action_params;

/// Free-form query parameters in caller-given order.
///
/// Serializes as a map so it can sit under `#[serde(flatten)]` next to the
/// fixed request fields; duplicate keys are passed through untouched.
#[derive(Debug, Clone, Default)]
pub(crate) struct OrderedParams(Vec<(String, String)>);

impl OrderedParams {
    pub(crate) fn from_pairs(pairs: &[(String, String)]) -> Self {
        Self(pairs.to_vec())
    }
}

impl Serialize for OrderedParams {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, value) in &self.0 {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}
