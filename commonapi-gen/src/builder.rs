//! Builder interface for the wrapper generator
use super::{
    ConfigError, GeneratedWrapper, GeneratorError, GeneratorResult, RenderedWrapper,
    config::GeneratorConfig,
    render::{DEFAULT_CLIENT_TEMPLATE, DEFAULT_SERVICE_TEMPLATE, RenderContext, environment},
};
use fidl_parser::parse_fidl_file;
use log::{debug, info, warn};
use std::borrow::Cow;
use std::fs;
use std::path::Path;

/// Suffix of generated client headers
pub const CLIENT_SUFFIX: &str = "Client.hpp";
/// Suffix of generated service headers
pub const SERVICE_SUFFIX: &str = "Service.hpp";

/// Main generator builder
///
/// # Example
///
/// ```no_run
/// use commonapi_gen::Generator;
///
/// Generator::new()
///     .input("fidl/HelloWorld.fidl")
///     .output_dir("src-gen/wrappers")
///     .wrapper_name("Greeter")
///     .generate()?;
/// # Ok::<(), commonapi_gen::GeneratorError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Generator {
    config: GeneratorConfig,
}

impl Generator {
    /// Create a new generator with default configuration
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: GeneratorConfig::new(),
        }
    }

    /// Create a generator from an existing configuration
    #[must_use]
    pub fn with_config(config: GeneratorConfig) -> Self {
        Self { config }
    }

    /// Current configuration
    #[must_use]
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Set the `.fidl` file to generate wrappers for
    #[must_use]
    pub fn input<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config.input_file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Set the output directory, created when missing
    #[must_use]
    pub fn output_dir<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.config.output_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Use a client template file instead of the embedded default
    #[must_use]
    pub fn client_template<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config.client_template = Some(path.as_ref().to_path_buf());
        self
    }

    /// Use a service template file instead of the embedded default
    #[must_use]
    pub fn service_template<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config.service_template = Some(path.as_ref().to_path_buf());
        self
    }

    /// Add a wrapper class name
    ///
    /// Names are matched to interfaces in declaration order. Interfaces
    /// beyond the last name keep their own name; names beyond the last
    /// interface are ignored.
    ///
    /// # Example
    ///
    /// ```
    /// use commonapi_gen::Generator;
    ///
    /// let generator = Generator::new()
    ///     .wrapper_name("Greeter")
    ///     .wrapper_name("SecondGreeter");
    /// assert_eq!(generator.config().wrapper_names.len(), 2);
    /// ```
    #[must_use]
    pub fn wrapper_name<S: AsRef<str>>(mut self, name: S) -> Self {
        self.config.wrapper_names.push(name.as_ref().to_string());
        self
    }

    /// Add several wrapper class names
    #[must_use]
    pub fn wrapper_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.config
            .wrapper_names
            .extend(names.into_iter().map(|n| n.as_ref().to_string()));
        self
    }

    /// Fix the date stamped into the wrappers
    #[must_use]
    pub fn date<S: AsRef<str>>(mut self, date: S) -> Self {
        self.config.date = Some(date.as_ref().to_string());
        self
    }

    /// Render the wrappers of every interface without writing them
    ///
    /// # Errors
    ///
    /// Returns an error if no input is set, the input cannot be parsed or
    /// has no interfaces, a template cannot be read, or rendering fails.
    pub fn render(&self) -> GeneratorResult<Vec<RenderedWrapper>> {
        let input = self
            .config
            .input_file
            .as_ref()
            .ok_or(ConfigError::NoInputFile)?;

        let document = parse_fidl_file(input)?;
        debug!(
            "{}: {} interfaces, {} type collections",
            input.display(),
            document.interfaces.len(),
            document.type_collections.len()
        );

        let client_source =
            load_template(self.config.client_template.as_deref(), DEFAULT_CLIENT_TEMPLATE)?;
        let service_source =
            load_template(self.config.service_template.as_deref(), DEFAULT_SERVICE_TEMPLATE)?;

        let env = environment();
        let client_template = env.template_from_str(&client_source)?;
        let service_template = env.template_from_str(&service_source)?;

        if self.config.wrapper_names.len() > document.interfaces.len() {
            warn!(
                "{} wrapper names given for {} interfaces, extra names ignored",
                self.config.wrapper_names.len(),
                document.interfaces.len()
            );
        }

        let date = self.config.date_or_today();
        let mut rendered = Vec::with_capacity(document.interfaces.len());
        for (index, interface) in document.interfaces.iter().enumerate() {
            let class_name = self.config.wrapper_name(index, interface.name());
            let context = RenderContext::new(interface, &class_name, &date);
            debug!("rendering wrappers for {interface} as {class_name}");

            let client = client_template.render(&context)?;
            let service = service_template.render(&context)?;
            rendered.push(RenderedWrapper {
                interface: interface.name().to_string(),
                class_name,
                client,
                service,
            });
        }

        Ok(rendered)
    }

    /// Render the wrappers and write them to the output directory
    ///
    /// Each interface produces `<Name>Client.hpp` and `<Name>Service.hpp`.
    /// Nothing is written unless every wrapper rendered.
    ///
    /// # Errors
    ///
    /// Returns an error if the output directory is not set, rendering fails
    /// (see [`Generator::render`]), or a file cannot be written.
    pub fn generate(self) -> GeneratorResult<Vec<GeneratedWrapper>> {
        let output_dir = self
            .config
            .output_dir
            .clone()
            .ok_or(ConfigError::OutputDirectoryRequired)?;

        let rendered = self.render()?;

        fs::create_dir_all(&output_dir)?;

        let mut generated = Vec::with_capacity(rendered.len());
        for wrapper in rendered {
            let client = output_dir.join(format!("{}{CLIENT_SUFFIX}", wrapper.class_name));
            let service = output_dir.join(format!("{}{SERVICE_SUFFIX}", wrapper.class_name));
            fs::write(&client, wrapper.client)?;
            fs::write(&service, wrapper.service)?;
            info!("generated {} and {}", client.display(), service.display());

            generated.push(GeneratedWrapper {
                interface: wrapper.interface,
                client,
                service,
            });
        }

        Ok(generated)
    }
}

fn load_template<'a>(path: Option<&Path>, default: &'a str) -> GeneratorResult<Cow<'a, str>> {
    match path {
        Some(path) => {
            debug!("loading template {}", path.display());
            fs::read_to_string(path)
                .map(Cow::Owned)
                .map_err(|source| GeneratorError::TemplateRead {
                    path: path.to_path_buf(),
                    source,
                })
        }
        None => Ok(Cow::Borrowed(default)),
    }
}
