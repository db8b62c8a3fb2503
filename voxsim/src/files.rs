use std::io::{Read, Write};
use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use cgmath::{Point3, Vector3};
use directories::UserDirs;
use serde::{Deserialize, Serialize};

use voxsim_voxels::VoxelWorld;

use crate::settings::Settings;

const APP_DIR_NAME: &str = "voxsim";
const SAVE_DIR_NAME: &str = "saves";
const SETTINGS_DIR_NAME: &str = "settings";
const USER_SETTINGS_FILE_NAME: &str = "settings.yaml";
const WORLD_META_FILE_NAME: &str = "world_meta.yaml";
const WORLD_VOXELS_FILE_NAME: &str = "world_voxels.dat";

const VOXELS_MAGIC: &[u8; 4] = b"VXSM";
pub const FORMAT_VERSION: u32 = 1;

pub struct FileContext {
    /// Root directory for saved worlds.
    pub save_root: PathBuf,
    /// Root directory for user settings.
    pub settings_root: PathBuf,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorldMeta {
    pub version: u32,
    pub size: Vector3<i64>,
    pub player_position: Point3<f32>,
}

/// A world together with the agent's position, as stored in a save.
#[derive(Clone, Debug)]
pub struct SavedWorld {
    pub world: VoxelWorld,
    pub player_position: Point3<f32>,
}

impl FileContext {
    pub fn new(user_data_root: PathBuf) -> Self {
        let mut save_root = user_data_root.clone();
        save_root.push(SAVE_DIR_NAME);

        let mut settings_root = user_data_root;
        settings_root.push(SETTINGS_DIR_NAME);

        FileContext {
            save_root,
            settings_root,
        }
    }

    /// Uses the given data root, or a directory under the user's documents if there is none.
    pub fn load(data_root: Option<PathBuf>) -> Result<Self> {
        let user_data_root = match data_root {
            Some(data_root) => data_root,
            None => {
                let user_dirs =
                    UserDirs::new().ok_or_else(|| anyhow!("Could not find user directories."))?;
                let docs_dir = user_dirs
                    .document_dir()
                    .ok_or_else(|| anyhow!("Could not find document directory."))?;

                let mut root = PathBuf::new();
                root.push(docs_dir);
                root.push(APP_DIR_NAME);
                root
            }
        };

        log::info!("Using data root {:?}", user_data_root);
        Ok(FileContext::new(user_data_root))
    }

    pub fn ensure_directories(&self) -> Result<()> {
        std::fs::create_dir_all(&self.save_root).context("Creating save directory")?;
        std::fs::create_dir_all(&self.settings_root).context("Creating settings directory")?;
        Ok(())
    }

    pub fn load_settings(&self) -> Result<Settings> {
        let mut fp = self.settings_root.clone();
        fp.push(USER_SETTINGS_FILE_NAME);

        if fp.is_file() {
            log::info!("Loading settings from {:?}", fp);
            let file = std::fs::File::open(&fp).context("Opening settings file")?;
            Ok(serde_yaml::from_reader(file).context("Parsing settings file")?)
        } else {
            log::info!("Creating default settings file {:?}", fp);
            let settings = Settings::default();
            let file = std::fs::File::create(&fp).context("Creating settings file")?;
            serde_yaml::to_writer(file, &settings).context("Serializing settings")?;
            Ok(settings)
        }
    }

    fn get_save_dir(&self, save_name: &str) -> PathBuf {
        let mut res = self.save_root.clone();
        res.push(save_name);
        res
    }

    pub fn save_world(
        &self,
        save_name: &str,
        world: &VoxelWorld,
        player_position: Point3<f32>,
    ) -> Result<()> {
        let save_dir = self.get_save_dir(save_name);
        if !save_dir.is_dir() {
            log::info!("Creating save directory at {}", save_dir.to_string_lossy());
            std::fs::create_dir_all(&save_dir).context("Creating save directory")?;
        } else {
            log::info!(
                "Overwriting existing save at {}",
                save_dir.to_string_lossy()
            );
        }

        {
            let file_path = save_dir.join(WORLD_META_FILE_NAME);
            let meta = WorldMeta {
                version: FORMAT_VERSION,
                size: world.size(),
                player_position,
            };
            let file = std::fs::File::create(&file_path)
                .context("Creating world meta file for saved game")?;
            serde_yaml::to_writer(file, &meta)
                .context("Writing world meta file for saved game")?;
        }

        {
            let file_path = save_dir.join(WORLD_VOXELS_FILE_NAME);
            let file = std::fs::File::create(&file_path)
                .context("Creating world voxel file for saved game")?;
            let mut encoder = lz4::EncoderBuilder::new()
                .build(file)
                .context("Initializing encoder for voxel file")?;
            Self::write_world_voxels(world, &mut encoder)?;
            let (_file, res) = encoder.finish();
            res.context("Finishing voxel file")?;
        }

        Ok(())
    }

    /// Writes the uncompressed voxel stream: a short header followed by one byte per voxel.
    pub fn write_world_voxels<W: Write>(world: &VoxelWorld, target: &mut W) -> Result<()> {
        let size = world.size();
        target
            .write_all(VOXELS_MAGIC)
            .context("Writing voxel file header")?;
        target.write_u32::<LittleEndian>(FORMAT_VERSION)?;
        target.write_i64::<LittleEndian>(size.x)?;
        target.write_i64::<LittleEndian>(size.y)?;
        target.write_i64::<LittleEndian>(size.z)?;

        let count = world
            .serialize_voxels(target)
            .context("Writing out world voxels for saved game")?;
        log::info!("Wrote {} voxels", count);
        Ok(())
    }

    pub fn load_world(&self, save_name: &str) -> Result<SavedWorld> {
        let save_dir = self.get_save_dir(save_name);
        if !save_dir.is_dir() {
            bail!(
                "Saved game {} does not exist: expected {} to be a directory",
                save_name,
                save_dir.to_string_lossy()
            );
        }

        let meta_path = save_dir.join(WORLD_META_FILE_NAME);
        if !meta_path.is_file() {
            bail!(
                "World meta file for saved game {} does not exist: expected {} to be a file",
                save_name,
                meta_path.to_string_lossy()
            );
        }

        let data_path = save_dir.join(WORLD_VOXELS_FILE_NAME);
        if !data_path.is_file() {
            bail!(
                "Voxel file for saved game {} does not exist: expected {} to be a file",
                save_name,
                data_path.to_string_lossy()
            );
        }

        log::info!("loading world metadata from {:?}", meta_path);
        let meta_file = std::fs::File::open(meta_path.as_path())
            .context("Opening world meta file for saved game")?;
        let meta = Self::load_world_meta(meta_file)?;

        log::info!("loading world voxels from {:?}", data_path);
        let data_file = std::fs::File::open(data_path.as_path())
            .context("Opening voxel file for saved game")?;
        let mut decoder =
            lz4::Decoder::new(data_file).context("Initializing decoder for voxel file")?;
        let world = Self::read_world_voxels(&meta, &mut decoder)?;

        Ok(SavedWorld {
            world,
            player_position: meta.player_position,
        })
    }

    pub fn load_world_meta<R: Read>(file: R) -> Result<WorldMeta> {
        let meta: WorldMeta =
            serde_yaml::from_reader(file).context("Parsing world meta file for saved game")?;
        if meta.version != FORMAT_VERSION {
            bail!(
                "Unsupported save format version {} (expected {})",
                meta.version,
                FORMAT_VERSION
            );
        }
        Ok(meta)
    }

    /// Reads the uncompressed voxel stream and recomputes skylight.
    pub fn read_world_voxels<R: Read>(meta: &WorldMeta, src: &mut R) -> Result<VoxelWorld> {
        let mut magic = [0u8; 4];
        src.read_exact(&mut magic)
            .context("Reading voxel file header")?;
        if &magic != VOXELS_MAGIC {
            bail!("Voxel file has an unrecognized header");
        }

        let version = src.read_u32::<LittleEndian>()?;
        if version != meta.version {
            bail!(
                "Voxel file version {} does not match world meta version {}",
                version,
                meta.version
            );
        }

        let size = Vector3::new(
            src.read_i64::<LittleEndian>()?,
            src.read_i64::<LittleEndian>()?,
            src.read_i64::<LittleEndian>()?,
        );
        if size != meta.size {
            bail!(
                "Voxel file has size {:?} but world meta says {:?}",
                size,
                meta.size
            );
        }

        let mut world = VoxelWorld::new(size).context("Creating world for saved game")?;
        world
            .deserialize_voxels(src)
            .context("Deserializing world voxels")?;
        voxsim_voxels::propagate_skylight(&mut world);
        Ok(world)
    }
}

#[cfg(test)]
mod tests {
    use voxsim_voxels::Block;

    use super::*;

    fn sample_world() -> VoxelWorld {
        let mut world = VoxelWorld::new(Vector3::new(16, 32, 16)).unwrap();
        for x in 0..16 {
            for z in 0..16 {
                world.set(Point3::new(x, 31, z), Block::Bedrock);
                world.set(Point3::new(x, 20, z), Block::Grass);
            }
        }
        world.set(Point3::new(3, 19, 4), Block::Wheat5);
        world.set(Point3::new(7, 19, 7), Block::OakLeaves);
        world.set(Point3::new(15, 30, 0), Block::Fire);
        voxsim_voxels::propagate_skylight(&mut world);
        world
    }

    #[test]
    fn test_save_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = FileContext::new(dir.path().to_path_buf());
        ctx.ensure_directories().unwrap();

        let world = sample_world();
        let position = Point3::new(8.5, 17.25, 3.75);
        ctx.save_world("test", &world, position).unwrap();

        let loaded = ctx.load_world("test").unwrap();
        assert_eq!(loaded.player_position, position);
        assert_eq!(loaded.world, world);
    }

    #[test]
    fn test_missing_save() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = FileContext::new(dir.path().to_path_buf());
        ctx.ensure_directories().unwrap();

        assert!(ctx.load_world("nothing here").is_err());
    }

    #[test]
    fn test_size_mismatch_rejected() {
        let world = sample_world();
        let mut data = Vec::new();
        FileContext::write_world_voxels(&world, &mut data).unwrap();

        let meta = WorldMeta {
            version: FORMAT_VERSION,
            size: Vector3::new(16, 16, 16),
            player_position: Point3::new(0.0, 0.0, 0.0),
        };
        assert!(FileContext::read_world_voxels(&meta, &mut &data[..]).is_err());

        let meta = WorldMeta {
            size: world.size(),
            ..meta
        };
        let loaded = FileContext::read_world_voxels(&meta, &mut &data[..]).unwrap();
        assert_eq!(loaded, world);

        let mut truncated = &data[..data.len() - 1];
        assert!(FileContext::read_world_voxels(&meta, &mut truncated).is_err());
    }

    #[test]
    fn test_unknown_block_rejected() {
        let world = sample_world();
        let mut data = Vec::new();
        FileContext::write_world_voxels(&world, &mut data).unwrap();
        let last = data.len() - 1;
        data[last] = 250;

        let meta = WorldMeta {
            version: FORMAT_VERSION,
            size: world.size(),
            player_position: Point3::new(0.0, 0.0, 0.0),
        };
        assert!(FileContext::read_world_voxels(&meta, &mut &data[..]).is_err());
    }

    #[test]
    fn test_settings_created_on_first_load() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = FileContext::new(dir.path().to_path_buf());
        ctx.ensure_directories().unwrap();

        let created = ctx.load_settings().unwrap();
        assert!(ctx.settings_root.join(USER_SETTINGS_FILE_NAME).is_file());
        assert_eq!(ctx.load_settings().unwrap(), created);
    }
}
