//! One record of the [line protocol](https://docs.influxdata.com/influxdb/v2/reference/syntax/line-protocol/).

/// One named, timestamped, tagged, field-bearing record.
///
/// Tags and fields keep their insertion order, so the serialized line is
/// byte-identical for identical input.
#[must_use]
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    series: String,
    timestamp: i64,
    tags: Vec<(&'static str, &'static str)>,
    fields: Vec<(&'static str, f64)>,
}

impl Point {
    pub fn new(series: impl Into<String>, timestamp: i64) -> Self {
        Self { series: series.into(), timestamp, tags: Vec::new(), fields: Vec::new() }
    }

    pub fn with_tag(mut self, name: &'static str, value: &'static str) -> Self {
        self.tags.push((name, value));
        self
    }

    pub fn with_field(mut self, name: &'static str, value: f64) -> Self {
        self.fields.push((name, value));
        self
    }

    #[must_use]
    pub fn series(&self) -> &str {
        &self.series
    }

    #[must_use]
    pub const fn timestamp(&self) -> i64 {
        self.timestamp
    }

    #[must_use]
    pub fn field(&self, name: &str) -> Option<f64> {
        self.fields.iter().find(|(field, _)| *field == name).map(|(_, value)| *value)
    }

    /// Serialize into one line of the protocol, with second-precision timestamp.
    #[must_use]
    pub fn to_line_protocol(&self) -> String {
        let mut line = escape_measurement(&self.series);
        for (name, value) in &self.tags {
            line.push(',');
            line.push_str(&escape_tag(name));
            line.push('=');
            line.push_str(&escape_tag(value));
        }
        for (index, (name, value)) in self.fields.iter().enumerate() {
            line.push(if index == 0 { ' ' } else { ',' });
            line.push_str(&format!("{name}={value}"));
        }
        line.push_str(&format!(" {}", self.timestamp));
        line
    }
}

/// Measurement names escape commas and spaces.
fn escape_measurement(raw: &str) -> String {
    raw.replace(',', "\\,").replace(' ', "\\ ")
}

/// Tag keys and values additionally escape the equals sign.
fn escape_tag(raw: &str) -> String {
    raw.replace(',', "\\,").replace('=', "\\=").replace(' ', "\\ ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_point_ok() {
        let line = Point::new("consumption-total", 1_700_000_000)
            .with_tag("source", "power-meter")
            .with_field("P", 100.0)
            .with_field("Q", 5.0)
            .with_field("S", 100.1)
            .with_field("I_rms", 0.9)
            .with_field("V_rms", 230.0)
            .to_line_protocol();
        assert_eq!(
            line,
            "consumption-total,source=power-meter P=100,Q=5,S=100.1,I_rms=0.9,V_rms=230 1700000000",
        );
    }

    #[test]
    fn reduced_point_ok() {
        let line = Point::new("production-total", 1_700_000_005)
            .with_tag("source", "power-meter")
            .with_field("P", 0.0)
            .with_field("Q", 0.0)
            .with_field("S", 0.0)
            .to_line_protocol();
        assert_eq!(line, "production-total,source=power-meter P=0,Q=0,S=0 1700000005");
    }

    #[test]
    fn escaping_ok() {
        let line = Point::new("net total", 1)
            .with_tag("source", "power meter, garage")
            .with_field("P", 1.5)
            .to_line_protocol();
        assert_eq!(line, "net\\ total,source=power\\ meter\\,\\ garage P=1.5 1");
    }

    #[test]
    fn field_lookup_ok() {
        let point = Point::new("x", 0).with_field("P", 42.0);
        assert_eq!(point.field("P"), Some(42.0));
        assert_eq!(point.field("I_rms"), None);
    }
}
