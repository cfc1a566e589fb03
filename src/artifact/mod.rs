pub mod bundle;
pub mod classifier;
pub mod error;
pub mod store;

pub use bundle::{ArtifactBundle, BundleFile, LabelEncoder, MinValues, ReferenceOptions, BUNDLE_VERSION};
pub use classifier::{Classifier, ClassifierModel, DecisionTree, LogisticRegression, RandomForest, TreeNode};
pub use error::ArtifactError;
pub use store::{get_artifact_path, ArtifactStore, DEFAULT_ARTIFACT_FILE};
