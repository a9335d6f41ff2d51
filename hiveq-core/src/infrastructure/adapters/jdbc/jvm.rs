// hiveq-core/src/infrastructure/adapters/jdbc/jvm.rs

use jni::objects::{JObject, JString, JValue};
use jni::{InitArgsBuilder, JNIEnv, JNIVersion, JavaVM};
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

/// A process can host a single JVM; it is created on first use and shared.
static JVM: Mutex<Option<Arc<JavaVM>>> = Mutex::new(None);

pub fn shared_jvm(options: &[String]) -> Result<Arc<JavaVM>, String> {
    let mut slot = JVM
        .lock()
        .map_err(|_| "JVM registry mutex poisoned".to_string())?;
    if let Some(vm) = slot.as_ref() {
        debug!("Reusing running JVM; new -D options are ignored");
        return Ok(Arc::clone(vm));
    }

    let mut builder = InitArgsBuilder::new().version(JNIVersion::V8);
    for option in options {
        builder = builder.option(option);
    }
    let args = builder
        .build()
        .map_err(|e| format!("invalid JVM options: {}", e))?;
    let vm = JavaVM::new(args).map_err(|e| format!("failed to start the JVM: {}", e))?;
    info!(options = options.len(), "JVM started");

    let vm = Arc::new(vm);
    *slot = Some(Arc::clone(&vm));
    Ok(vm)
}

/// Turns a pending Java exception into its `toString()`, clearing it so the
/// thread can keep calling into the JVM. Falls back to the JNI error text.
pub fn describe_error(env: &mut JNIEnv, err: jni::errors::Error) -> String {
    if !matches!(err, jni::errors::Error::JavaException) {
        return err.to_string();
    }
    let Ok(throwable) = env.exception_occurred() else {
        return err.to_string();
    };
    let _ = env.exception_clear();
    let described = env
        .call_method(&throwable, "toString", "()Ljava/lang/String;", &[])
        .and_then(|v| v.l())
        .and_then(|obj| read_string(env, obj));
    match described {
        Ok(Some(text)) => text,
        _ => {
            let _ = env.exception_clear();
            "unknown Java exception".to_string()
        }
    }
}

/// Reads a `java.lang.String` (possibly null) and frees the local ref.
pub fn read_string(env: &mut JNIEnv, obj: JObject) -> jni::errors::Result<Option<String>> {
    if obj.is_null() {
        return Ok(None);
    }
    let jstr = JString::from(obj);
    let text: String = env.get_string(&jstr)?.into();
    env.delete_local_ref(jstr)?;
    Ok(Some(text))
}

/// `Object method(String)` helper used for every one-string-arg JDBC call.
pub fn call_with_string<'local>(
    env: &mut JNIEnv<'local>,
    target: &JObject,
    method: &str,
    signature: &str,
    arg: &str,
) -> jni::errors::Result<jni::objects::JValueOwned<'local>> {
    let jarg = env.new_string(arg)?;
    let result = env.call_method(target, method, signature, &[JValue::Object(&jarg)]);
    env.delete_local_ref(jarg)?;
    result
}
