// hiveq-core/src/domain/remediation.rs
//
// Maps raw driver error text to actionable guidance. Drivers only hand us
// strings (Java exception messages, Thrift status text), so matching is
// textual.

use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Remediation {
    /// TLS handshake or certificate validation failed.
    Certificate,
    /// No usable Java runtime / JVM could be started.
    JavaRuntime,
    /// The JDBC driver class is not on the class path.
    DriverClass,
    /// The JDBC bridge was not compiled in.
    JdbcFeature,
}

impl Remediation {
    pub fn hint(self) -> &'static str {
        match self {
            Remediation::Certificate => {
                "SSL/certificate error. Set 'truststore_path' (and 'truststore_password') to a \
                 truststore containing the server certificate, or set \
                 'disable_ssl_verification: true' for testing only."
            }
            Remediation::JavaRuntime => {
                "Java runtime not found or not usable. Install a JDK/JRE, make sure 'java' is on \
                 PATH or JAVA_HOME points to it, or set 'check_java: false' to skip the check."
            }
            Remediation::DriverClass => {
                "JDBC driver class not found. Check 'hive_driver_class' and point \
                 'hive_driver_jar' at the standalone Hive JDBC jar (see hive-driver-download)."
            }
            Remediation::JdbcFeature => {
                "This build has no JDBC support. Rebuild with `cargo build --features jdbc` or \
                 switch the profile to Thrift (host/port/auth)."
            }
        }
    }
}

impl fmt::Display for Remediation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.hint())
    }
}

struct Patterns {
    certificate: Option<Regex>,
    java: Option<Regex>,
    driver: Option<Regex>,
}

// Anchored on Java exception and JSSE message names: driver errors embed the
// JDBC URL (`;ssl=true`) and user table names, so bare words like `ssl` or
// `jvm` would misfire.
fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| Patterns {
        certificate: Regex::new(
            r"(?i)(javax\.net\.ssl\.|SSLHandshakeException|SSLPeerUnverifiedException|SSLException|CertificateException|CertPathValidatorException|PKIX path|unable to find valid certification path|trustAnchors|certificate verify failed)",
        )
        .ok(),
        java: Regex::new(
            r"(?i)(libjvm|JNI_CreateJavaVM|UnsatisfiedLinkError|JAVA_HOME|No Java runtime|Unable to locate a Java Runtime|java: (command )?not found)",
        )
        .ok(),
        driver: Regex::new(r"(ClassNotFoundException|NoClassDefFoundError|No suitable driver)").ok(),
    })
}

fn matches(re: &Option<Regex>, message: &str) -> bool {
    re.as_ref().is_some_and(|re| re.is_match(message))
}

/// Certificate problems win over Java ones: an SSL failure raised from inside
/// the JVM mentions both.
pub fn classify(message: &str) -> Option<Remediation> {
    let p = patterns();
    if matches(&p.certificate, message) {
        Some(Remediation::Certificate)
    } else if matches(&p.driver, message) {
        Some(Remediation::DriverClass)
    } else if matches(&p.java, message) {
        Some(Remediation::JavaRuntime)
    } else {
        None
    }
}
