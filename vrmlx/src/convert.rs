//! End-to-end conversion: text in, mesh out
use crate::{
    Error,
    action::{ActionMap, to_geom_actions},
    config::Config,
    executor::Executor,
    mesh::Mesh,
    parser::{self, ParsedFile},
    schema::{Catalog, Synonyms},
    task::MeshTask,
    traverse::{TraversalScope, Traversor},
};
use log::info;
use std::path::Path;

/// Reusable conversion pipeline
///
/// A converter holds everything that does not depend on the input file: the
/// configuration, the catalog, the action map, and the executor.
///
/// ```
/// use vrmlx::{config::Config, convert::Converter};
///
/// let conv = Converter::new(Config::default())?;
/// let mesh = conv.convert_str(
///     "#VRML V2.0 utf8
///     Shape { geometry Box { size 1 1 1 } }",
/// )?;
/// assert_eq!(mesh.vertices.len(), 8);
/// assert_eq!(mesh.triangles.len(), 12);
/// # Ok::<(), vrmlx::Error>(())
/// ```
pub struct Converter {
    config: Config,
    catalog: Catalog,
    synonyms: Synonyms,
    actions: ActionMap<MeshTask>,
    executor: Executor,
}

impl Converter {
    /// Builds a converter, loading the synonym table named by the config
    pub fn new(config: Config) -> Result<Self, Error> {
        let synonyms = match &config.synonyms_file {
            Some(path) => Synonyms::from_file(path)?,
            None => Synonyms::new(),
        };
        let executor = Executor::from_config(&config.parallelism)?;
        Ok(Self::with_parts(config, synonyms, executor))
    }

    /// Builds a converter from already-loaded parts
    pub fn with_parts(
        config: Config,
        synonyms: Synonyms,
        executor: Executor,
    ) -> Self {
        Self {
            catalog: Catalog::standard().with_synonyms(&synonyms),
            synonyms,
            config,
            actions: to_geom_actions(),
            executor,
        }
    }

    /// Replaces the executor
    pub fn set_executor(&mut self, executor: Executor) {
        self.executor = executor;
    }

    /// Returns the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the executor
    pub fn executor(&self) -> &Executor {
        &self.executor
    }

    /// Traverses a parsed file, collecting its geometry tasks
    pub fn tasks(&self, parsed: &ParsedFile) -> Result<Vec<MeshTask>, Error> {
        let scope = TraversalScope {
            document: &parsed.document,
            aliases: &parsed.aliases,
            catalog: &self.catalog,
            synonyms: &self.synonyms,
            config: &self.config,
        };
        let ctx = Traversor::new(scope, &self.actions).traverse_file()?;
        Ok(ctx.into_inner())
    }

    /// Converts a VRML document held in memory
    pub fn convert_bytes(&self, input: &[u8]) -> Result<Mesh, Error> {
        let parsed = parser::parse(input)?;
        let tasks = self.tasks(&parsed)?;
        Ok(self.executor.run_and_merge(tasks))
    }

    /// Converts a VRML document held in a string
    pub fn convert_str(&self, input: &str) -> Result<Mesh, Error> {
        self.convert_bytes(input.as_bytes())
    }

    /// Converts a VRML file
    pub fn convert_file<P: AsRef<Path>>(&self, path: P) -> Result<Mesh, Error> {
        let path = path.as_ref();
        info!("converting {path:?}");
        let data = std::fs::read(path)?;
        self.convert_bytes(&data)
    }

    /// Converts a VRML file and writes the mesh in the configured format
    pub fn convert_to_file<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        input: P,
        output: Q,
    ) -> Result<Mesh, Error> {
        let mesh = self.convert_file(input)?;
        let output = output.as_ref();
        let mut f = std::fs::File::create(output)?;
        mesh.write(
            &mut f,
            self.config.export_format,
            self.config.export_binary,
        )?;
        info!("wrote {output:?}");
        Ok(mesh)
    }
}
