// hiveq-core/src/infrastructure/adapters/jdbc/options.rs
//
// Pure translation of a JDBC profile into JVM start options and the URL the
// driver sees. Kept free of JNI so it builds and tests without a JDK.

use crate::domain::profile::{JdbcSettings, StoreSettings};

/// Appended to the URL when certificate checks are switched off.
pub const INSECURE_URL_PARAMS: &str = "AllowSelfSignedCerts=1;CAIssuedCertNamesMismatch=1";

/// URL handed to `DriverManager.getConnection`.
pub fn effective_url(settings: &JdbcSettings) -> String {
    if !settings.tls.disable_verification {
        return settings.url.clone();
    }
    let mut url = settings.url.trim_end_matches(';').to_string();
    url.push(';');
    url.push_str(INSECURE_URL_PARAMS);
    url
}

/// `-D` options for the embedded JVM: class path plus `javax.net.ssl.*`.
pub fn jvm_options(settings: &JdbcSettings) -> Vec<String> {
    let mut options = Vec::new();
    if let Some(jar) = &settings.driver_jar {
        options.push(format!("-Djava.class.path={}", jar.display()));
    }
    if let Some(store) = &settings.tls.truststore {
        push_store(&mut options, "trustStore", store);
    }
    if let Some(store) = &settings.tls.keystore {
        push_store(&mut options, "keyStore", store);
    }
    options
}

fn push_store(options: &mut Vec<String>, prefix: &str, store: &StoreSettings) {
    options.push(format!("-Djavax.net.ssl.{}={}", prefix, store.path.display()));
    if let Some(password) = &store.password {
        options.push(format!("-Djavax.net.ssl.{}Password={}", prefix, password));
    }
    if let Some(kind) = &store.store_type {
        options.push(format!("-Djavax.net.ssl.{}Type={}", prefix, kind));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::profile::TlsSettings;
    use std::path::PathBuf;

    fn settings() -> JdbcSettings {
        JdbcSettings {
            url: "jdbc:hive2://h:10001/default;ssl=true;".into(),
            driver_class: "org.apache.hive.jdbc.HiveDriver".into(),
            username: "u".into(),
            password: "p".into(),
            driver_jar: Some(PathBuf::from("drivers/hive-jdbc-3.1.2-standalone.jar")),
            tls: TlsSettings::default(),
            check_java: true,
        }
    }

    #[test]
    fn test_url_untouched_by_default() {
        let s = settings();
        assert_eq!(effective_url(&s), s.url);
    }

    #[test]
    fn test_disable_verification_appends_params() {
        let mut s = settings();
        s.tls.disable_verification = true;
        assert_eq!(
            effective_url(&s),
            "jdbc:hive2://h:10001/default;ssl=true;AllowSelfSignedCerts=1;CAIssuedCertNamesMismatch=1"
        );
    }

    #[test]
    fn test_jvm_options_cover_class_path_and_stores() {
        let mut s = settings();
        s.tls.truststore = Some(StoreSettings {
            path: PathBuf::from("/etc/pki/hive.jks"),
            password: Some("changeit".into()),
            store_type: Some("JKS".into()),
        });
        s.tls.keystore = Some(StoreSettings {
            path: PathBuf::from("client.p12"),
            password: None,
            store_type: None,
        });

        assert_eq!(
            jvm_options(&s),
            vec![
                "-Djava.class.path=drivers/hive-jdbc-3.1.2-standalone.jar",
                "-Djavax.net.ssl.trustStore=/etc/pki/hive.jks",
                "-Djavax.net.ssl.trustStorePassword=changeit",
                "-Djavax.net.ssl.trustStoreType=JKS",
                "-Djavax.net.ssl.keyStore=client.p12",
            ]
        );
    }
}
