//! Patch installer tests

use aihubmix_shim::genai::{
    Client, ClientFactory, ClientOptions, Content, ContentItem, ContentNormalizer, ContentsInput,
    FileSource, FilesApi, GenAiLibrary, GenerateContentConfig, GenerateContentResponse, HttpOptions,
    FunctionCall, GenerationConfig, ModelsApi, Part, StandardNormalizer, UploadFileConfig, File,
};
use aihubmix_shim::shim::{ClientCredentials, EvictionPolicy, PatchInstaller, ShimCapabilities};
use aihubmix_shim::{ShimError, ShimResult};
use async_trait::async_trait;
use secrecy::SecretString;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing_test::traced_test;

/// Models API that records the normalized contents it receives
#[derive(Default)]
struct RecordingModels {
    seen: Mutex<Vec<Vec<Content>>>,
    calls: Mutex<Vec<(String, Option<GenerateContentConfig>)>>,
}

#[async_trait]
impl ModelsApi for RecordingModels {
    async fn generate_content(
        &self,
        model: &str,
        contents: ContentsInput,
        config: Option<GenerateContentConfig>,
    ) -> ShimResult<GenerateContentResponse> {
        let list = aihubmix_shim::genai::normalize::contents_to_list(contents);
        self.seen.lock().unwrap().push(list);
        self.calls.lock().unwrap().push((model.to_string(), config));
        Ok(GenerateContentResponse::default())
    }
}

/// Files API standing in for the relay's broken native upload
struct NativeFiles;

#[async_trait]
impl FilesApi for NativeFiles {
    async fn upload(&self, _file: FileSource, _config: Option<UploadFileConfig>) -> ShimResult<File> {
        Err(ShimError::Unsupported("native upload reached".to_string()))
    }
}

#[derive(Default)]
struct FakeFactory {
    models: Arc<RecordingModels>,
    created: Mutex<Vec<ClientOptions>>,
}

impl ClientFactory for FakeFactory {
    fn create(&self, options: ClientOptions) -> ShimResult<Client> {
        self.created.lock().unwrap().push(options.clone());
        let models: Arc<dyn ModelsApi> = self.models.clone();
        Ok(Client::new(options, Arc::new(NativeFiles), models))
    }
}

/// Factory whose constructor always fails
struct FailingFactory;

impl ClientFactory for FailingFactory {
    fn create(&self, _options: ClientOptions) -> ShimResult<Client> {
        Err(ShimError::InvalidConfig("constructor exploded".to_string()))
    }
}

fn library(factory: Arc<dyn ClientFactory>, with_normalizer: bool) -> GenAiLibrary {
    let normalizer: Option<Arc<dyn ContentNormalizer>> = if with_normalizer {
        Some(Arc::new(StandardNormalizer))
    } else {
        None
    };
    GenAiLibrary {
        version: "test".to_string(),
        factory: Some(factory),
        normalizer,
    }
}

fn credentials() -> ClientCredentials {
    ClientCredentials::new(
        SecretString::from("sk-relay".to_string()),
        "https://aihubmix.com/",
        "gemini-2.5-pro",
    )
}

fn caller_options() -> ClientOptions {
    ClientOptions {
        api_key: Some("caller-supplied".to_string()),
        http_options: HttpOptions {
            base_url: Some("https://generativelanguage.googleapis.com".to_string()),
            ..Default::default()
        },
    }
}

#[test]
fn test_disabled_leaves_library_untouched() {
    let factory: Arc<dyn ClientFactory> = Arc::new(FakeFactory::default());
    let original = library(factory.clone(), true);

    let installation = PatchInstaller::new(None).install(original.clone());

    assert_eq!(installation.capabilities, ShimCapabilities::default());
    assert!(installation.store.is_none());
    assert!(Arc::ptr_eq(installation.library.factory.as_ref().unwrap(), &factory));
    assert!(Arc::ptr_eq(
        installation.library.normalizer.as_ref().unwrap(),
        original.normalizer.as_ref().unwrap()
    ));

    let client = installation.library.create_client(caller_options()).unwrap();
    assert_eq!(client.api_key(), Some("caller-supplied"));
}

#[test]
fn test_construction_always_uses_configured_key() {
    let fake = Arc::new(FakeFactory::default());
    let installation = PatchInstaller::new(Some(credentials())).install(library(fake.clone(), true));

    let first = installation.library.create_client(caller_options()).unwrap();
    let second = installation.library.create_client(ClientOptions::default()).unwrap();

    for client in [&first, &second] {
        assert_eq!(client.api_key(), Some("sk-relay"));
        assert_eq!(client.base_url(), Some("https://aihubmix.com/gemini"));
    }

    let created = fake.created.lock().unwrap();
    assert_eq!(created.len(), 2);
    assert_eq!(created[0].http_options.base_url, created[1].http_options.base_url);
}

#[tokio::test]
async fn test_upload_then_generate_inlines_bytes() {
    let fake = Arc::new(FakeFactory::default());
    let installation = PatchInstaller::new(Some(credentials())).install(library(fake.clone(), true));
    assert!(installation.capabilities.upload_bypass);

    let client = installation.library.create_client(caller_options()).unwrap();
    let file = client
        .files()
        .upload(FileSource::from(b"captcha-bytes".to_vec()), None)
        .await
        .unwrap();

    client
        .models()
        .generate_content(
            "gemini-2.5-pro",
            ContentsInput::Mixed(vec![
                ContentItem::Text("Which tiles contain a bus?".to_string()),
                ContentItem::File(file.clone()),
            ]),
            None,
        )
        .await
        .unwrap();

    let seen = fake.models.seen.lock().unwrap();
    let parts = &seen[0][0].parts;
    assert_eq!(parts[1], Part::from_bytes(b"captcha-bytes".to_vec(), "image/png"));
    assert!(parts.iter().all(|p| p.file_uri() != Some(file.uri.as_str())));
}

#[tokio::test]
async fn test_rewrite_forwards_model_config_and_other_parts() {
    let fake = Arc::new(FakeFactory::default());
    let installation = PatchInstaller::new(Some(credentials())).install(library(fake.clone(), true));
    let client = installation.library.create_client(caller_options()).unwrap();

    let file = client
        .files()
        .upload(FileSource::from(b"tile".to_vec()), None)
        .await
        .unwrap();

    let function_call = Part::FunctionCall {
        function_call: FunctionCall {
            name: "click_tile".to_string(),
            args: serde_json::json!({"index": 3}),
        },
    };
    let unmodelled: Part =
        serde_json::from_value(serde_json::json!({"executableCode": {"language": "PYTHON", "code": "1+1"}})).unwrap();
    let foreign = Part::from_uri("https://generativelanguage.googleapis.com/v1beta/files/abc", "image/jpeg");

    let contents = vec![
        Content::with_role("model", vec![function_call.clone(), unmodelled.clone()]),
        Content::user(vec![
            Part::text("next tile?"),
            Part::from_uri(file.uri.clone(), "image/png"),
            foreign.clone(),
        ]),
    ];
    let config = GenerateContentConfig {
        system_instruction: Some(Content::user(vec![Part::text("answer with an index")])),
        generation: Some(GenerationConfig {
            temperature: Some(0.2),
            max_output_tokens: Some(16),
            ..Default::default()
        }),
    };

    client
        .models()
        .generate_content("gemini-2.5-flash", ContentsInput::Contents(contents), Some(config.clone()))
        .await
        .unwrap();

    let calls = fake.models.calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, "gemini-2.5-flash");
    assert_eq!(calls[0].1, Some(config));

    let seen = fake.models.seen.lock().unwrap();
    assert_eq!(seen[0][0].role, "model");
    assert_eq!(seen[0][0].parts, vec![function_call, unmodelled]);
    assert_eq!(
        seen[0][1].parts,
        vec![
            Part::text("next tile?"),
            Part::from_bytes(b"tile".to_vec(), "image/png"),
            foreign,
        ]
    );
}

#[tokio::test]
async fn test_distinct_uploads_yield_distinct_references() {
    let installation = PatchInstaller::new(Some(credentials()))
        .install(library(Arc::new(FakeFactory::default()), true));
    let client = installation.library.create_client(ClientOptions::default()).unwrap();

    let a = client.files().upload(FileSource::from(b"a".to_vec()), None).await.unwrap();
    let b = client.files().upload(FileSource::from(b"b".to_vec()), None).await.unwrap();

    assert_ne!(a.uri, b.uri);
    assert_eq!(installation.store.unwrap().len(), 2);
}

#[tokio::test]
async fn test_clients_share_one_store() {
    let fake = Arc::new(FakeFactory::default());
    let installation = PatchInstaller::new(Some(credentials())).install(library(fake.clone(), true));

    let uploader = installation.library.create_client(ClientOptions::default()).unwrap();
    let caller = installation.library.create_client(ClientOptions::default()).unwrap();

    let file = uploader.files().upload(FileSource::from(b"shared".to_vec()), None).await.unwrap();
    caller
        .models()
        .generate_content("m", ContentsInput::File(file), None)
        .await
        .unwrap();

    let seen = fake.models.seen.lock().unwrap();
    assert_eq!(seen[0][0].parts[0], Part::from_bytes(b"shared".to_vec(), "image/png"));
}

#[tokio::test]
#[traced_test]
async fn test_missing_normalizer_keeps_redirect() {
    let installation =
        PatchInstaller::new(Some(credentials())).install(library(Arc::new(FakeFactory::default()), false));

    assert_eq!(
        installation.capabilities,
        ShimCapabilities {
            construction_redirect: true,
            upload_bypass: false,
        }
    );
    assert!(logs_contain("Upload bypass unavailable"));

    let client = installation.library.create_client(caller_options()).unwrap();
    assert_eq!(client.api_key(), Some("sk-relay"));
    assert_eq!(client.base_url(), Some("https://aihubmix.com/gemini"));

    // Native upload path is left in place
    let result = client.files().upload(FileSource::from(b"x".to_vec()), None).await;
    assert!(matches!(result, Err(ShimError::Unsupported(_))));
}

#[test]
#[traced_test]
fn test_missing_factory_is_contained() {
    let installation = PatchInstaller::new(Some(credentials())).install(GenAiLibrary {
        version: "0.0.1".to_string(),
        factory: None,
        normalizer: Some(Arc::new(StandardNormalizer)),
    });

    assert!(!installation.capabilities.construction_redirect);
    assert!(installation.library.factory.is_none());
    assert!(logs_contain("client factory not found"));
    assert!(matches!(
        installation.library.create_client(ClientOptions::default()),
        Err(ShimError::Unsupported(_))
    ));
}

#[test]
#[traced_test]
fn test_invalid_credentials_abort_installation() {
    let factory: Arc<dyn ClientFactory> = Arc::new(FakeFactory::default());
    let bad = ClientCredentials::new(SecretString::from("sk-relay".to_string()), "aihubmix", "m");

    let installation = PatchInstaller::new(Some(bad)).install(library(factory.clone(), true));

    assert_eq!(installation.capabilities, ShimCapabilities::default());
    assert!(installation.store.is_none());
    assert!(Arc::ptr_eq(installation.library.factory.as_ref().unwrap(), &factory));
    assert!(logs_contain("failed to install construction redirect"));
}

#[test]
fn test_constructor_errors_propagate() {
    let installation =
        PatchInstaller::new(Some(credentials())).install(library(Arc::new(FailingFactory), true));

    let err = installation.library.create_client(caller_options()).unwrap_err();
    assert_eq!(err.to_string(), "Invalid configuration: constructor exploded");
}

#[tokio::test]
async fn test_expired_upload_is_not_inlined() {
    let fake = Arc::new(FakeFactory::default());
    let installation = PatchInstaller::new(Some(credentials()))
        .with_eviction(EvictionPolicy::ExpireAfter(Duration::ZERO))
        .install(library(fake.clone(), true));
    let client = installation.library.create_client(ClientOptions::default()).unwrap();

    let file = client.files().upload(FileSource::from(b"stale".to_vec()), None).await.unwrap();
    client
        .models()
        .generate_content("m", ContentsInput::File(file.clone()), None)
        .await
        .unwrap();

    let seen = fake.models.seen.lock().unwrap();
    assert_eq!(seen[0][0].parts[0].file_uri(), Some(file.uri.as_str()));
}
