//! KYC 提示词目录
//!
//! 提示词对抽取服务不透明，这里只负责拼装

use crate::models::DocumentType;
use crate::services::extraction_service::ExtractionPrompt;

const KYC_CONTEXT: &str = "You are working with a financial services industry (FSI) enterprise account for their know your customer (KYC) process.";

/// 文档分类提示词
pub fn classification_prompt() -> ExtractionPrompt {
    let response_pattern = "{'document_type': 'passport or drivers_licence', 'state': \"if drivers licence, the state it's from, otherwise None\"}";
    ExtractionPrompt {
        system: format!(
            "{} You will be given Identity Verification documents and must determine if it is an American drivers licence or passport",
            KYC_CONTEXT
        ),
        user: format!(
            "Is this Identity Verification document a drivers licence or passport? Return response in the following format: {}",
            response_pattern
        ),
    }
}

/// 按文档类型选择字段抽取提示词
pub fn extraction_prompt(document: DocumentType) -> ExtractionPrompt {
    match document {
        DocumentType::Passport => passport_prompt(),
        DocumentType::DriversLicence => drivers_licence_prompt(),
    }
}

/// 护照字段：LN, FN, NATIONALITY, POB, EXP, DOB
pub fn passport_prompt() -> ExtractionPrompt {
    let response_pattern = "{'LN': 'Doe', 'FN': 'John', 'NATIONALITY': 'USA', 'POB': 'CALIFORNIA', 'EXP': '01/01/2020', 'DOB': '01/01/2020'}";
    ExtractionPrompt {
        system: format!(
            "{} You will be given Identity Verification documents in the form of travel Passports and must extract information such as name and date of birth (DOB) customer.",
            KYC_CONTEXT
        ),
        user: format!(
            "what is the surname last name (LN), given first name (FN) which may contain two first names such as Janice Ann or John Q, nationality, place of birth (POB), date of birth (DOB), and date of expiration (DOE) provided by the user? The date of birth and expiration must be in a numerical format such as 01/01/2020. Provide you answer in the following format: {}. Disregard all other information not in the response pattern.",
            response_pattern
        ),
    }
}

/// 驾照字段：DL, EXP, FN, LN, DOB
pub fn drivers_licence_prompt() -> ExtractionPrompt {
    let response_pattern = "{'DL': 'abcd12345', 'EXP': '01/01/2020', 'FN': 'John', 'LN': 'Doe', 'DOB': '01/01/2020'}";
    ExtractionPrompt {
        system: format!(
            "{} You will be given Identity Verification documents such as Passports & Drivers license and must extract information such as drivers licence number, name, and date of birth (DOB).",
            KYC_CONTEXT
        ),
        user: format!(
            "what is the drivers licence (DL) number denoted by the number 1, expiration date (EXP), last name (LN), first name (FN) which may contain two first names such as Janice Ann or John Q, and date of birth (DOB) provided by the user? Provide you answer in the following format: {}. Disregard all other information not in the response pattern.",
            response_pattern
        ),
    }
}
